use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::{Dataset, DatasetRow};
use crate::error::Result;
use crate::language::Language;
use crate::quality::{Evaluator, ScoringInput};
use crate::report::{BatchReport, FailureKind, TranslationFailure};
use crate::translate::{Engine, TranslationService};

/// Both arms' output for one text
#[derive(Debug)]
pub struct Comparison {
    pub llm: Result<String>,
    pub baseline: Result<String>,
}

pub struct Workflow {
    config: Config,
    service: TranslationService,
    evaluator: Evaluator,
}

impl Workflow {
    /// Fails with a configuration error when the LLM credential is missing
    pub fn new(config: Config) -> Result<Self> {
        let service = TranslationService::from_config(&config)?;
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: Config, service: TranslationService) -> Self {
        let evaluator = Evaluator::new(config.evaluation.clone());
        Self {
            config,
            service,
            evaluator,
        }
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    /// Translate one text with both arms; a failure in one arm does not hide the other
    pub async fn compare(&self, text: &str, language: Language) -> Comparison {
        let llm = self.service.translate(text, language).await;
        let baseline = self.service.translate_baseline(text, language).await;
        Comparison { llm, baseline }
    }

    /// Call the engine, retrying provider failures up to `llm.max_retries` attempts
    pub async fn translate_with_retries(&self, engine: Engine, text: &str, language: Language) -> Result<String> {
        let translator = self.service.translator(engine);
        let max_attempts = self.config.llm.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match translator.translate(text, language).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    warn!("│ {} attempt {} failed: {}", engine, attempt, e);
                    attempt += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
                outcome => return outcome,
            }
        }
    }

    /// Load a dataset and evaluate every row with each requested engine
    pub async fn evaluate_dataset<P: AsRef<Path>>(
        &self,
        path: P,
        language: Language,
        engines: &[Engine],
    ) -> Result<BatchReport> {
        let path = path.as_ref();
        let dataset = Dataset::load(path, &self.config.dataset)?;

        let progress = ProgressBar::new((dataset.len() * engines.len()) as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut report = self
            .evaluate_rows(dataset.rows(), language, engines, Some(&progress))
            .await;
        progress.finish_with_message("done");

        report.dataset = Some(path.display().to_string());
        Ok(report)
    }

    /// Translate and score `rows` in order. Translation failures are
    /// recorded in the report and the run moves on to the next row.
    pub async fn evaluate_rows(
        &self,
        rows: &[DatasetRow],
        language: Language,
        engines: &[Engine],
        progress: Option<&ProgressBar>,
    ) -> BatchReport {
        info!(
            "Evaluating {} rows in {} with engines {:?}",
            rows.len(),
            language,
            engines
        );

        let mut inputs = Vec::with_capacity(rows.len() * engines.len());
        let mut failures = Vec::new();
        let total = rows.len();

        for row in rows {
            info!("┌─ Row {}/{} ────────", row.index + 1, total);
            info!("│ Source: {}", row.source_text);

            for &engine in engines {
                if let Some(pb) = progress {
                    pb.set_message(format!("row {} ({})", row.index + 1, engine));
                }

                match self.translate_with_retries(engine, &row.source_text, language).await {
                    Ok(candidate) => {
                        info!("│ {}: {}", engine, candidate);
                        inputs.push(ScoringInput {
                            row: row.index,
                            engine,
                            language,
                            candidate,
                            reference: row.reference_text.clone(),
                        });
                    }
                    Err(e) => {
                        warn!("│ {} failed: {}", engine, e);
                        failures.push(TranslationFailure {
                            row: row.index,
                            engine,
                            kind: FailureKind::of(&e),
                            message: e.to_string(),
                        });
                    }
                }

                if let Some(pb) = progress {
                    pb.inc(1);
                }
            }
            info!("└─────────────────────────────────────");
        }

        let stats = self.evaluator.evaluate_batch(&inputs);
        info!(
            "Scored {} candidates, skipped {}, {} translation failures",
            stats.scored_count(),
            stats.skipped_count(),
            failures.len()
        );

        BatchReport::new(None, rows.len(), &stats, failures)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::error::{CopyglotError, Result};
use crate::language::Language;
use crate::quality::{BatchStatistics, RunningStats, SkippedRecord};
use crate::translate::Engine;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub sample_std_dev: Option<f64>,
}

impl From<&RunningStats> for MetricSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            mean: stats.mean(),
            std_dev: stats.std_dev(),
            sample_std_dev: stats.sample_std_dev(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub engine: Engine,
    pub language: Language,
    pub count: u64,
    pub meteor: MetricSummary,
    pub bleu: MetricSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Translation,
    PlaceholderIntegrity,
    Other,
}

impl FailureKind {
    pub fn of(error: &CopyglotError) -> Self {
        match error {
            CopyglotError::TranslationFailed(_) => Self::Translation,
            CopyglotError::PlaceholderIntegrity { .. } => Self::PlaceholderIntegrity,
            _ => Self::Other,
        }
    }
}

/// A row/engine pair that produced no candidate translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationFailure {
    pub row: usize,
    pub engine: Engine,
    pub kind: FailureKind,
    pub message: String,
}

/// Final outcome of an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub dataset: Option<String>,
    pub rows: usize,
    pub groups: Vec<GroupReport>,
    pub skipped: usize,
    pub skipped_records: Vec<SkippedRecord>,
    pub translation_failures: Vec<TranslationFailure>,
}

impl BatchReport {
    pub fn new(
        dataset: Option<String>,
        rows: usize,
        stats: &BatchStatistics,
        translation_failures: Vec<TranslationFailure>,
    ) -> Self {
        let groups = stats
            .groups()
            .map(|(engine, language, metrics)| GroupReport {
                engine,
                language,
                count: metrics.count(),
                meteor: MetricSummary::from(&metrics.meteor),
                bleu: MetricSummary::from(&metrics.bleu),
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            dataset,
            rows,
            groups,
            skipped: stats.skipped_count(),
            skipped_records: stats.skipped().to_vec(),
            translation_failures,
        }
    }

    pub fn group(&self, engine: Engine, language: Language) -> Option<&GroupReport> {
        self.groups
            .iter()
            .find(|g| g.engine == engine && g.language == language)
    }

    pub fn failure_count(&self, engine: Engine, kind: FailureKind) -> usize {
        self.translation_failures
            .iter()
            .filter(|f| f.engine == engine && f.kind == kind)
            .count()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Report written to {}", path.display());
        Ok(())
    }

    /// Plain-text table for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nEvaluation run {} ({})", self.run_id, self.generated_at.to_rfc3339());
        if let Some(dataset) = &self.dataset {
            let _ = writeln!(out, "Dataset: {} ({} rows)", dataset, self.rows);
        }
        let _ = writeln!(
            out,
            "\n{:<10} {:<12} {:>6} {:>14} {:>14}",
            "Engine", "Language", "Count", "METEOR", "BLEU"
        );
        let _ = writeln!(out, "{}", "-".repeat(60));
        for group in &self.groups {
            let _ = writeln!(
                out,
                "{:<10} {:<12} {:>6} {:>14} {:>14}",
                group.engine.label(),
                group.language.name(),
                group.count,
                format_metric(&group.meteor),
                format_metric(&group.bleu)
            );
        }

        let _ = writeln!(out, "\nSkipped records: {}", self.skipped);
        for skipped in &self.skipped_records {
            let _ = writeln!(out, "  row {} [{}]: {}", skipped.row + 1, skipped.engine, skipped.reason);
        }

        let _ = writeln!(out, "Translation failures: {}", self.translation_failures.len());
        for failure in &self.translation_failures {
            let _ = writeln!(out, "  row {} [{}]: {}", failure.row + 1, failure.engine, failure.message);
        }
        out
    }
}

fn format_metric(summary: &MetricSummary) -> String {
    match (summary.mean, summary.std_dev) {
        (Some(mean), Some(std_dev)) => format!("{:.2}% ±{:.2}", mean * 100.0, std_dev * 100.0),
        _ => "n/a".to_string(),
    }
}

// Translation quality scoring
//
// - tokenize: scoring tokens (placeholders whole, CJK per character)
// - bleu: sentence BLEU with brevity penalty
// - meteor: sentence METEOR with exact / stem / synonym alignment
// - stats: running mean and standard deviation per (engine, language)

pub mod bleu;
pub mod meteor;
pub mod stats;
pub mod tokenize;

use rust_stemmers::Stemmer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::EvaluationConfig;
use crate::error::{CopyglotError, Result};
use crate::language::Language;
use crate::translate::Engine;

pub use meteor::{MeteorParams, SynonymTable};
pub use stats::{BatchStatistics, MetricStats, RunningStats, SkippedRecord};

/// One candidate/reference comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub candidate_translation: String,
    pub reference_translation: String,
    pub meteor_score: f64,
    pub bleu_score: f64,
}

/// Input for `Evaluator::evaluate_batch`
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringInput {
    /// Dataset row the candidate came from
    pub row: usize,
    pub engine: Engine,
    pub language: Language,
    pub candidate: String,
    pub reference: String,
}

pub struct Evaluator {
    config: EvaluationConfig,
    params: MeteorParams,
    synonyms: SynonymTable,
    stemmers: HashMap<Language, Stemmer>,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        let params = MeteorParams {
            alpha: config.meteor_alpha,
            beta: config.meteor_beta,
            gamma: config.meteor_gamma,
        };
        let synonyms = SynonymTable::new(&config.synonym_groups, config.lowercase);
        let stemmers = Language::ALL
            .into_iter()
            .filter_map(|lang| lang.stemmer_algorithm().map(|alg| (lang, Stemmer::create(alg))))
            .collect();

        Self {
            config,
            params,
            synonyms,
            stemmers,
        }
    }

    /// Score without language-specific stemming
    pub fn score(&self, candidate: &str, reference: &str) -> Result<EvaluationRecord> {
        self.score_in(None, candidate, reference)
    }

    pub fn score_in(
        &self,
        language: Option<Language>,
        candidate: &str,
        reference: &str,
    ) -> Result<EvaluationRecord> {
        if candidate.trim().is_empty() {
            return Err(CopyglotError::InvalidInput("candidate translation is empty".to_string()));
        }
        if reference.trim().is_empty() {
            return Err(CopyglotError::InvalidInput("reference translation is empty".to_string()));
        }

        let candidate_tokens = tokenize::tokenize(candidate, self.config.lowercase);
        let reference_tokens = tokenize::tokenize(reference, self.config.lowercase);
        if candidate_tokens.is_empty() || reference_tokens.is_empty() {
            return Err(CopyglotError::ScoringFailure("tokenization produced no tokens".to_string()));
        }

        let stemmer = language.and_then(|lang| self.stemmers.get(&lang));
        let meteor_score = meteor::sentence_meteor(
            &candidate_tokens,
            &reference_tokens,
            self.params,
            stemmer,
            &self.synonyms,
        );
        let bleu_score = bleu::sentence_bleu(&candidate_tokens, &reference_tokens, self.config.bleu_max_order);

        if !meteor_score.is_finite() || !bleu_score.is_finite() {
            return Err(CopyglotError::ScoringFailure(format!(
                "non-finite score (meteor: {}, bleu: {})",
                meteor_score, bleu_score
            )));
        }

        Ok(EvaluationRecord {
            candidate_translation: candidate.to_string(),
            reference_translation: reference.to_string(),
            meteor_score,
            bleu_score,
        })
    }

    pub fn evaluate_batch(&self, records: &[ScoringInput]) -> BatchStatistics {
        self.evaluate_batch_with_progress(records, |_, _| {})
    }

    /// Score every record in input order, calling `progress` after each one.
    /// Failed records are skipped and listed; they never abort the batch.
    pub fn evaluate_batch_with_progress<F>(&self, records: &[ScoringInput], mut progress: F) -> BatchStatistics
    where
        F: FnMut(&ScoringInput, &Result<EvaluationRecord>),
    {
        let mut stats = BatchStatistics::new();

        for input in records {
            let outcome = self.score_in(Some(input.language), &input.candidate, &input.reference);
            match &outcome {
                Ok(record) => {
                    debug!(
                        "Row {} [{} {}] meteor {:.4} bleu {:.4}",
                        input.row, input.engine, input.language, record.meteor_score, record.bleu_score
                    );
                    stats.record(input.engine, input.language, record.meteor_score, record.bleu_score);
                }
                Err(e) => {
                    warn!("Row {} [{} {}] skipped: {}", input.row, input.engine, input.language, e);
                    stats.skip(SkippedRecord {
                        row: input.row,
                        engine: input.engine,
                        language: input.language,
                        reason: e.to_string(),
                    });
                }
            }
            progress(input, &outcome);
        }

        stats
    }
}

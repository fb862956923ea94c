use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::language::Language;
use crate::translate::Engine;

/// Count, sum and sum of squares of a stream of scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    /// Population standard deviation (divides by n)
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let variance = self.sum_sq / self.count as f64 - mean * mean;
        Some(variance.max(0.0).sqrt())
    }

    /// Sample standard deviation (divides by n - 1); needs two values
    pub fn sample_std_dev(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        let n = self.count as f64;
        let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        Some(variance.max(0.0).sqrt())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub meteor: RunningStats,
    pub bleu: RunningStats,
}

impl MetricStats {
    pub fn count(&self) -> u64 {
        self.meteor.count()
    }
}

/// A record left out of the aggregates, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub row: usize,
    pub engine: Engine,
    pub language: Language,
    pub reason: String,
}

/// Aggregates for one batch run, keyed by (engine, language)
#[derive(Debug, Clone, Default)]
pub struct BatchStatistics {
    groups: BTreeMap<(Engine, Language), MetricStats>,
    skipped: Vec<SkippedRecord>,
}

impl BatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.groups.clear();
        self.skipped.clear();
    }

    pub fn record(&mut self, engine: Engine, language: Language, meteor: f64, bleu: f64) {
        let stats = self.groups.entry((engine, language)).or_default();
        stats.meteor.push(meteor);
        stats.bleu.push(bleu);
    }

    pub fn skip(&mut self, record: SkippedRecord) {
        self.skipped.push(record);
    }

    pub fn get(&self, engine: Engine, language: Language) -> Option<&MetricStats> {
        self.groups.get(&(engine, language))
    }

    pub fn groups(&self) -> impl Iterator<Item = (Engine, Language, &MetricStats)> {
        self.groups
            .iter()
            .map(|((engine, language), stats)| (*engine, *language, stats))
    }

    pub fn scored_count(&self) -> u64 {
        self.groups.values().map(MetricStats::count).sum()
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

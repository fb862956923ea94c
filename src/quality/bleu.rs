//! Sentence-level BLEU.
//!
//! Modified n-gram precision up to `max_order` with uniform weights and the
//! standard brevity penalty. Orders above the candidate length are dropped
//! (effective order), and orders from 2 upward use add-one smoothing
//! (Lin & Och, 2004) so a single missing 4-gram does not zero a short
//! sentence. Candidate and reference play different roles, so
//! `bleu(a, b) != bleu(b, a)` in general.

use std::collections::HashMap;

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    for gram in tokens.windows(n) {
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Clipped matches and total candidate n-grams for order `n`
fn modified_precision(candidate: &[String], reference: &[String], n: usize) -> (usize, usize) {
    let candidate_counts = ngram_counts(candidate, n);
    let reference_counts = ngram_counts(reference, n);

    let matches = candidate_counts
        .iter()
        .map(|(gram, &count)| count.min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let total = candidate_counts.values().sum();
    (matches, total)
}

pub fn brevity_penalty(candidate_len: usize, reference_len: usize) -> f64 {
    if candidate_len == 0 {
        0.0
    } else if candidate_len > reference_len {
        1.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}

pub fn sentence_bleu(candidate: &[String], reference: &[String], max_order: usize) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let order = max_order.max(1).min(candidate.len());
    let mut log_sum = 0.0;

    for n in 1..=order {
        let (mut matches, mut total) = modified_precision(candidate, reference, n);
        if n > 1 {
            matches += 1;
            total += 1;
        }
        if matches == 0 {
            return 0.0;
        }
        log_sum += (matches as f64 / total as f64).ln();
    }

    let score = brevity_penalty(candidate.len(), reference.len()) * (log_sum / order as f64).exp();
    score.clamp(0.0, 1.0)
}

//! Sentence-level METEOR with NLTK's parameterisation.
//!
//! Tokens are aligned in three rounds (exact, stem, synonym), each pairing a
//! candidate token with the first still-free equal reference token. The
//! score is the harmonic mean `P·R / (α·P + (1-α)·R)` scaled by
//! `1 - γ·(chunks/matches)^β`. An alignment that covers both sides as one
//! chunk is a verbatim match and carries no penalty.

use rust_stemmers::Stemmer;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteorParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl Default for MeteorParams {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            beta: 3.0,
            gamma: 0.5,
        }
    }
}

/// Words in the same group count as synonyms of each other
#[derive(Debug, Clone, Default)]
pub struct SynonymTable {
    group_of: HashMap<String, usize>,
}

impl SynonymTable {
    pub fn new(groups: &[Vec<String>], lowercase: bool) -> Self {
        let mut group_of = HashMap::new();
        for (id, group) in groups.iter().enumerate() {
            for word in group {
                let word = if lowercase { word.to_lowercase() } else { word.clone() };
                group_of.entry(word).or_insert(id);
            }
        }
        Self { group_of }
    }

    pub fn group(&self, word: &str) -> Option<usize> {
        self.group_of.get(word).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.group_of.is_empty()
    }
}

/// (candidate index, reference index) pairs
type Alignment = Vec<(usize, usize)>;

fn align_round<K, F>(
    candidate: &[String],
    reference: &[String],
    key: F,
    candidate_used: &mut [bool],
    reference_used: &mut [bool],
    alignment: &mut Alignment,
) where
    K: PartialEq,
    F: Fn(&str) -> Option<K>,
{
    let reference_keys: Vec<Option<K>> = reference.iter().map(|t| key(t)).collect();

    for (i, token) in candidate.iter().enumerate() {
        if candidate_used[i] {
            continue;
        }
        let Some(wanted) = key(token) else { continue };

        let hit = reference_keys
            .iter()
            .enumerate()
            .find(|(j, k)| !reference_used[*j] && k.as_ref() == Some(&wanted))
            .map(|(j, _)| j);

        if let Some(j) = hit {
            candidate_used[i] = true;
            reference_used[j] = true;
            alignment.push((i, j));
        }
    }
}

pub fn align(
    candidate: &[String],
    reference: &[String],
    stemmer: Option<&Stemmer>,
    synonyms: &SynonymTable,
) -> Alignment {
    let mut candidate_used = vec![false; candidate.len()];
    let mut reference_used = vec![false; reference.len()];
    let mut alignment = Vec::new();

    align_round(
        candidate,
        reference,
        |t| Some(t.to_string()),
        &mut candidate_used,
        &mut reference_used,
        &mut alignment,
    );

    if let Some(stemmer) = stemmer {
        align_round(
            candidate,
            reference,
            |t| Some(stemmer.stem(t).into_owned()),
            &mut candidate_used,
            &mut reference_used,
            &mut alignment,
        );
    }

    if !synonyms.is_empty() {
        align_round(
            candidate,
            reference,
            |t| synonyms.group(t),
            &mut candidate_used,
            &mut reference_used,
            &mut alignment,
        );
    }

    alignment.sort_unstable();
    alignment
}

/// Number of runs that are contiguous on both sides
pub fn count_chunks(alignment: &[(usize, usize)]) -> usize {
    if alignment.is_empty() {
        return 0;
    }
    1 + alignment
        .windows(2)
        .filter(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            !(next.0 == prev.0 + 1 && next.1 == prev.1 + 1)
        })
        .count()
}

pub fn sentence_meteor(
    candidate: &[String],
    reference: &[String],
    params: MeteorParams,
    stemmer: Option<&Stemmer>,
    synonyms: &SynonymTable,
) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let alignment = align(candidate, reference, stemmer, synonyms);
    let matches = alignment.len();
    if matches == 0 {
        return 0.0;
    }

    let precision = matches as f64 / candidate.len() as f64;
    let recall = matches as f64 / reference.len() as f64;
    let fmean = precision * recall / (params.alpha * precision + (1.0 - params.alpha) * recall);

    let chunks = count_chunks(&alignment);
    let verbatim = chunks == 1 && matches == candidate.len() && matches == reference.len();
    let penalty = if verbatim {
        0.0
    } else {
        params.gamma * (chunks as f64 / matches as f64).powf(params.beta)
    };

    (fmean * (1.0 - penalty)).clamp(0.0, 1.0)
}

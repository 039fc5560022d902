//! Approximate string similarity on a 0-100 scale
//!
//! Both the recipe resolver and the ingredient matcher rank candidates through
//! the [`Similarity`] trait, so the metric can be swapped without touching the
//! matching policy.
//!
//! # Metrics
//! - [`TokenSetRatio`] (default): order-insensitive. Compares the shared tokens
//!   against each side's full token set, so a query whose words are all present
//!   in a title scores 100.
//! - [`LevenshteinRatio`]: whole-string normalized Levenshtein.
//!
//! Both lower-case their inputs and treat any non-alphanumeric character as a
//! word separator before comparing.

use greenbite_common::config::SimilarityMetric;
use std::collections::BTreeSet;

/// A similarity metric returning 0 (nothing shared) to 100 (equivalent)
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;

    /// Metric name for logging
    fn name(&self) -> &'static str;
}

/// Token-set ratio backed by normalized Levenshtein
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

/// Plain normalized Levenshtein ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct LevenshteinRatio;

/// Lower-case, map non-alphanumerics to spaces, collapse whitespace
pub fn normalize_for_similarity(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

fn to_percent(similarity: f64) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

impl Similarity for TokenSetRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a = normalize_for_similarity(a);
        let b = normalize_for_similarity(b);
        if a.is_empty() || b.is_empty() {
            return 0;
        }

        let tokens_a: BTreeSet<&str> = a.split(' ').collect();
        let tokens_b: BTreeSet<&str> = b.split(' ').collect();

        let intersection = join_tokens(tokens_a.intersection(&tokens_b).copied());
        let only_a = join_tokens(tokens_a.difference(&tokens_b).copied());
        let only_b = join_tokens(tokens_b.difference(&tokens_a).copied());

        let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
        let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

        let mut best = ratio(&combined_a, &combined_b);
        if !intersection.is_empty() {
            best = best
                .max(ratio(&intersection, &combined_a))
                .max(ratio(&intersection, &combined_b));
        }

        to_percent(best)
    }

    fn name(&self) -> &'static str {
        "token_set_ratio"
    }
}

impl Similarity for LevenshteinRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a = normalize_for_similarity(a);
        let b = normalize_for_similarity(b);
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        to_percent(ratio(&a, &b))
    }

    fn name(&self) -> &'static str {
        "levenshtein_ratio"
    }
}

/// Metric selected by `matching.metric`
pub fn for_metric(metric: SimilarityMetric) -> Box<dyn Similarity> {
    match metric {
        SimilarityMetric::TokenSet => Box::new(TokenSetRatio),
        SimilarityMetric::Levenshtein => Box::new(LevenshteinRatio),
    }
}

/// A choice and its similarity to the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    /// Index into the choices slice
    pub index: usize,
    pub score: u8,
}

/// Up to `limit` best-scoring choices, highest first
///
/// The sort is stable: choices with equal scores keep their input order.
pub fn extract<S: AsRef<str>>(
    similarity: &dyn Similarity,
    query: &str,
    choices: &[S],
    limit: usize,
) -> Vec<Scored> {
    let mut scored: Vec<Scored> = choices
        .iter()
        .enumerate()
        .map(|(index, choice)| Scored {
            index,
            score: similarity.score(query, choice.as_ref()),
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Single best choice; the earliest one wins a tie
pub fn best_match<S: AsRef<str>>(
    similarity: &dyn Similarity,
    query: &str,
    choices: &[S],
) -> Option<Scored> {
    let mut best: Option<Scored> = None;
    for (index, choice) in choices.iter().enumerate() {
        let score = similarity.score(query, choice.as_ref());
        if best.map_or(true, |b| score > b.score) {
            best = Some(Scored { index, score });
        }
    }
    best
}

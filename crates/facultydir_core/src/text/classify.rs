//! Target-discipline department classifier.
//!
//! # Responsibility
//! - Decide whether a free-text department name belongs to the target
//!   discipline, using configured phrase lists.
//!
//! # Invariants
//! - Positive phrases are checked first and win over negative ones.
//! - Names matching neither list are rejected.

use crate::config::ClassifierConfig;

/// Keyword-based, order-sensitive department predicate.
#[derive(Debug, Clone)]
pub struct DepartmentClassifier {
    positive: Vec<String>,
    negative: Vec<String>,
    negative_exact: Vec<String>,
}

impl DepartmentClassifier {
    /// Builds a classifier; phrases are lowercased and trimmed once here.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            positive: normalize_phrases(&config.positive_phrases),
            negative: normalize_phrases(&config.negative_phrases),
            negative_exact: normalize_phrases(&config.negative_exact),
        }
    }

    pub fn is_target_discipline(&self, name: &str) -> bool {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }

        if contains_any(&lower, &self.positive) {
            return true;
        }

        if contains_any(&lower, &self.negative) {
            return false;
        }
        if self.negative_exact.contains(&lower) {
            return false;
        }

        false
    }
}

impl Default for DepartmentClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn contains_any(haystack: &str, phrases: &[String]) -> bool {
    phrases
        .iter()
        .any(|phrase| haystack.contains(phrase.as_str()))
}

fn normalize_phrases(phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .map(|phrase| phrase.trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

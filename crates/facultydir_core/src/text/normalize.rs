//! Raw cell text normalization.
//!
//! # Responsibility
//! - Turn free-text spreadsheet cells into canonical lists and tokens.
//!
//! # Invariants
//! - Every function is total: bad or empty input yields an empty result.
//! - No I/O and no hidden state; output depends only on input.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("valid line regex"));
static ENUMERATION_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\s*").expect("valid enumeration regex"));
static NON_ALNUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid keyword separator regex"));
static SLUG_DROP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]+").expect("valid slug punctuation regex"));
static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]+").expect("valid slug separator regex"));

/// English function words plus `overview`, never emitted as keywords.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "in", "on", "of", "for", "and", "or", "to", "with", "by", "from", "at", "as",
    "into", "about", "over", "under", "between", "through", "without", "within", "across", "is",
    "are", "be", "this", "that", "these", "those", "overview",
];

const MIN_KEYWORD_CHARS: usize = 3;

/// Splits an affiliation cell into distinct department names.
///
/// Lines first, then commas. Pieces are trimmed, empties dropped, and
/// duplicates removed keeping first-seen order.
pub fn parse_department_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    LINE_BREAK_RE
        .split(raw)
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .filter(|piece| seen.insert(*piece))
        .map(str::to_string)
        .collect()
}

/// Splits a publication cell into titles, dropping `"<n>. "` prefixes.
///
/// Duplicates are kept; they collapse later by natural key.
pub fn parse_publication_titles(raw: &str) -> Vec<String> {
    LINE_BREAK_RE
        .split(raw)
        .map(|line| ENUMERATION_PREFIX_RE.replace(line, ""))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Derives lowercase content keywords from a publication title.
pub fn extract_keywords(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    let cleaned = NON_ALNUM_RE.replace_all(&lowered, " ");

    let mut seen = HashSet::new();
    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|token| !STOP_WORDS.contains(token))
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// URL-safe form of a name: ASCII, lowercase, hyphen separated.
///
/// Diacritics are transliterated, punctuation dropped, and whitespace or
/// hyphen runs collapse to a single `-`.
pub fn slugify(name: &str) -> String {
    let ascii = deunicode(name).to_lowercase();
    let stripped = SLUG_DROP_RE.replace_all(&ascii, "");
    let hyphenated = SLUG_SEPARATOR_RE.replace_all(stripped.trim(), "-");
    hyphenated.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        extract_keywords, parse_department_list, parse_publication_titles, slugify, STOP_WORDS,
    };

    #[test]
    fn department_list_splits_lines_then_commas() {
        assert_eq!(
            parse_department_list("CS, AI\nRobotics"),
            vec!["CS", "AI", "Robotics"]
        );
    }

    #[test]
    fn department_list_dedups_and_drops_empties() {
        assert_eq!(
            parse_department_list(" Computer Science ,\r\n\r\nData Science,Computer Science,, "),
            vec!["Computer Science", "Data Science"]
        );
        assert!(parse_department_list("").is_empty());
        assert!(parse_department_list(" , \n ").is_empty());
    }

    #[test]
    fn publication_titles_strip_enumeration() {
        assert_eq!(
            parse_publication_titles("1. Foo\n2. Bar"),
            vec!["Foo", "Bar"]
        );
        assert_eq!(
            parse_publication_titles("  10.Deep Nets \r\n\r\nPlain title\n3. Plain title"),
            vec!["Deep Nets", "Plain title", "Plain title"]
        );
        assert!(parse_publication_titles("\n \n").is_empty());
    }

    #[test]
    fn publication_titles_keep_inner_numbers() {
        assert_eq!(
            parse_publication_titles("2. Version 2.0 of the tool"),
            vec!["Version 2.0 of the tool"]
        );
    }

    #[test]
    fn keywords_drop_stopwords_short_tokens_and_duplicates() {
        let keywords = extract_keywords(
            "Artificial intelligence-enabled predictive modelling in psychiatry: overview of machine learning applications in mental health research.",
        );
        assert_eq!(
            keywords,
            vec![
                "artificial",
                "intelligence",
                "enabled",
                "predictive",
                "modelling",
                "psychiatry",
                "machine",
                "learning",
                "applications",
                "mental",
                "health",
                "research",
            ]
        );
    }

    #[test]
    fn keywords_never_contain_forbidden_tokens() {
        let titles = [
            "The Overview of AI, ML and the Web",
            "A-B-C: an   analysis on data data DATA",
            "",
            "!!! ??? ...",
            "Über die Analyse von Daten zwischen 2019 und 2020",
        ];
        for title in titles {
            let keywords = extract_keywords(title);
            let mut unique = keywords.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), keywords.len(), "duplicates in {keywords:?}");
            for keyword in &keywords {
                assert!(keyword.len() > 2, "short token {keyword}");
                assert!(
                    !STOP_WORDS.contains(&keyword.as_str()),
                    "stopword {keyword}"
                );
            }
        }
    }

    #[test]
    fn slugify_strips_diacritics_and_punctuation() {
        assert_eq!(slugify("Computer Science"), "computer-science");
        assert_eq!(slugify("  AI & Robotics  "), "ai-robotics");
        assert_eq!(slugify("École d'Informatique"), "ecole-dinformatique");
        assert_eq!(slugify("Cyber -- Security"), "cyber-security");
        assert_eq!(slugify("***"), "");
    }
}

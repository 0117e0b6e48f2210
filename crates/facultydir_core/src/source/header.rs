//! Header matching for the fixed faculty sheet schema.

use crate::source::{SourceColumn, SourceError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Trims, lowercases and collapses inner whitespace runs to one space.
pub fn normalize_header(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").to_lowercase()
}

/// Positions of the six logical columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    indices: [usize; SourceColumn::ALL.len()],
}

impl ColumnMap {
    /// Resolves every logical column against raw header cells.
    ///
    /// When a normalized header appears twice, the right-most cell wins.
    ///
    /// # Errors
    /// - `SourceError::MissingColumn` naming the first absent column, with the
    ///   normalized headers that were available.
    pub fn resolve(header: &[String]) -> Result<Self, SourceError> {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            let key = normalize_header(cell);
            if !key.is_empty() {
                by_name.insert(key, index);
            }
        }

        let mut indices = [0; SourceColumn::ALL.len()];
        for column in SourceColumn::ALL {
            let key = normalize_header(column.label());
            match by_name.get(&key) {
                Some(index) => indices[column as usize] = *index,
                None => {
                    return Err(SourceError::MissingColumn {
                        column: column.label(),
                        available: available_headers(header),
                    })
                }
            }
        }

        Ok(Self { indices })
    }

    pub fn index(&self, column: SourceColumn) -> usize {
        self.indices[column as usize]
    }
}

fn available_headers(header: &[String]) -> Vec<String> {
    let mut available: Vec<String> = Vec::new();
    for cell in header {
        let key = normalize_header(cell);
        if !key.is_empty() && !available.contains(&key) {
            available.push(key);
        }
    }
    available
}

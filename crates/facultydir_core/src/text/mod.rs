//! Pure text processing used by reconciliation.
//!
//! # Responsibility
//! - Normalize raw spreadsheet cells into names, titles, keywords and slugs.
//! - Classify department names against the target discipline.
//!
//! # Invariants
//! - Nothing in this module touches the store.

pub mod classify;
pub mod normalize;

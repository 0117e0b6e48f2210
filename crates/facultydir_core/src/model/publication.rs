//! Publication domain model.
//!
//! # Responsibility
//! - Define publication records keyed by `(title, kind)`.
//! - Track the author set and import provenance.
//!
//! # Invariants
//! - The author set only grows; nothing in core removes an author.
//! - `keywords` is derived from the title once, at creation.

use crate::model::faculty::FacultyId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier for a publication row.
pub type PublicationId = Uuid;

/// Publication category. Part of the natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationKind {
    Article,
    Conference,
}

impl PublicationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Conference => "conference",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "article" => Some(Self::Article),
            "conference" => Some(Self::Conference),
            _ => None,
        }
    }

    /// Source-sheet column label that feeds publications of this kind.
    pub fn column_label(self) -> &'static str {
        match self {
            Self::Article => "Article",
            Self::Conference => "Conference Paper",
        }
    }

    /// Reverse of [`PublicationKind::column_label`].
    pub fn from_column_label(label: &str) -> Option<Self> {
        match label {
            "Article" => Some(Self::Article),
            "Conference Paper" => Some(Self::Conference),
            _ => None,
        }
    }
}

/// Where a publication was first seen in a source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationSource {
    /// 1-based sheet row number (header is row 1).
    pub sheet_row: u32,
    /// Column the title was read from.
    pub kind: PublicationKind,
}

/// Canonical publication record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    pub title: String,
    pub kind: PublicationKind,
    pub authors: HashSet<FacultyId>,
    pub keywords: Vec<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub source: Option<PublicationSource>,
}

impl Publication {
    /// Creates an author-less publication with a generated id.
    pub fn new(kind: PublicationKind, title: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            authors: HashSet::new(),
            keywords,
            year: None,
            venue: None,
            doi: None,
            url: None,
            source: None,
        }
    }

    /// Adds an author. Returns `true` only when the set actually grew.
    pub fn add_author(&mut self, faculty_id: FacultyId) -> bool {
        self.authors.insert(faculty_id)
    }

    pub fn has_author(&self, faculty_id: FacultyId) -> bool {
        self.authors.contains(&faculty_id)
    }
}

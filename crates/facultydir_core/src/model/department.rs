//! Department domain model.
//!
//! # Responsibility
//! - Define the department record and its categorical type.
//! - Infer the type from free-text department names.
//!
//! # Invariants
//! - `name` is the natural key; `slug` is globally unique and never changes
//!   once assigned.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a department row.
pub type DepartmentId = Uuid;

/// Organizational unit kind, inferred from keywords in the department name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentType {
    School,
    Centre,
    Group,
    College,
    #[default]
    Other,
}

impl DepartmentType {
    /// Infers the type by substring match on the lowercased name.
    ///
    /// Checks run in a fixed order and the first match wins:
    /// `school`, then `centre`/`center`, then `group`, then `college`.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("school") {
            Self::School
        } else if lower.contains("centre") || lower.contains("center") {
            Self::Centre
        } else if lower.contains("group") {
            Self::Group
        } else if lower.contains("college") {
            Self::College
        } else {
            Self::Other
        }
    }

    /// Storage/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Centre => "centre",
            Self::Group => "group",
            Self::College => "college",
            Self::Other => "other",
        }
    }

    /// Parses the storage representation; unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "school" => Some(Self::School),
            "centre" => Some(Self::Centre),
            "group" => Some(Self::Group),
            "college" => Some(Self::College),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Canonical department record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub slug: String,
    /// Serialized as `type` to match the directory API schema.
    #[serde(rename = "type")]
    pub kind: DepartmentType,
    pub description: Option<String>,
    pub is_target_discipline: bool,
}

impl Department {
    /// Creates a department with a generated id and an inferred type.
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        is_target_discipline: bool,
    ) -> Self {
        let name = name.into();
        let kind = DepartmentType::infer_from_name(&name);
        Self {
            id: Uuid::new_v4(),
            name,
            slug: slug.into(),
            kind,
            description: None,
            is_target_discipline,
        }
    }
}

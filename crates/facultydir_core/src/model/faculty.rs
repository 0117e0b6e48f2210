//! Faculty domain model.
//!
//! # Responsibility
//! - Define faculty records keyed by `(name, position)`.
//! - Provide union-merge helpers for the relationship sets.
//!
//! # Invariants
//! - Relationship sets never shrink through these helpers.
//! - `raw_department_affiliation` keeps the first-seen source text verbatim.
//!
//! Two rows with the same name but a differently spelled position resolve to
//! two distinct faculty members. There is no fuzzy matching on position.

use crate::model::department::DepartmentId;
use crate::model::publication::{PublicationId, PublicationKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Stable identifier for a faculty row.
pub type FacultyId = Uuid;

/// Canonical faculty record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub position: Option<String>,
    pub research_interest: Option<String>,
    /// Affiliation cell exactly as it appeared when the faculty was created.
    pub raw_department_affiliation: String,
    pub department_ids: HashSet<DepartmentId>,
    pub article_ids: HashSet<PublicationId>,
    pub conference_paper_ids: HashSet<PublicationId>,
}

impl Faculty {
    /// Creates a faculty record with empty relationship sets.
    pub fn new(
        name: impl Into<String>,
        position: Option<String>,
        research_interest: Option<String>,
        raw_department_affiliation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            position,
            research_interest,
            raw_department_affiliation: raw_department_affiliation.into(),
            department_ids: HashSet::new(),
            article_ids: HashSet::new(),
            conference_paper_ids: HashSet::new(),
        }
    }

    /// Unions `incoming` into the department set.
    ///
    /// Returns the ids that were not already present, in `incoming` order and
    /// without repeats. An empty result means nothing needs persisting.
    pub fn merge_departments(&mut self, incoming: &[DepartmentId]) -> Vec<DepartmentId> {
        merge_into(&mut self.department_ids, incoming)
    }

    /// Unions `incoming` into the article or conference-paper set.
    pub fn merge_publications(
        &mut self,
        kind: PublicationKind,
        incoming: &[PublicationId],
    ) -> Vec<PublicationId> {
        merge_into(self.publication_ids_mut(kind), incoming)
    }

    pub fn publication_ids(&self, kind: PublicationKind) -> &HashSet<PublicationId> {
        match kind {
            PublicationKind::Article => &self.article_ids,
            PublicationKind::Conference => &self.conference_paper_ids,
        }
    }

    fn publication_ids_mut(&mut self, kind: PublicationKind) -> &mut HashSet<PublicationId> {
        match kind {
            PublicationKind::Article => &mut self.article_ids,
            PublicationKind::Conference => &mut self.conference_paper_ids,
        }
    }
}

fn merge_into(set: &mut HashSet<Uuid>, incoming: &[Uuid]) -> Vec<Uuid> {
    incoming
        .iter()
        .copied()
        .filter(|id| set.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::Faculty;
    use crate::model::publication::PublicationKind;
    use std::collections::HashSet;
    use uuid::Uuid;

    #[test]
    fn merge_departments_unions_and_reports_additions() {
        let d1 = Uuid::new_v4();
        let d2 = Uuid::new_v4();
        let mut faculty = Faculty::new("Ada Lovelace", Some("Lecturer".into()), None, "CS");

        assert_eq!(faculty.merge_departments(&[d1]), vec![d1]);
        assert_eq!(faculty.merge_departments(&[d1, d2, d2]), vec![d2]);
        assert!(faculty.merge_departments(&[d2, d1]).is_empty());
        assert_eq!(faculty.department_ids, HashSet::from([d1, d2]));
    }

    #[test]
    fn merge_publications_targets_kind_specific_set() {
        let article = Uuid::new_v4();
        let paper = Uuid::new_v4();
        let mut faculty = Faculty::new("Alan Turing", None, None, "");

        faculty.merge_publications(PublicationKind::Article, &[article]);
        faculty.merge_publications(PublicationKind::Conference, &[paper]);

        let articles = faculty.publication_ids(PublicationKind::Article);
        assert!(articles.contains(&article));
        assert!(!articles.contains(&paper));
        assert!(faculty.conference_paper_ids.contains(&paper));
    }
}

//! Per-run entity resolution.
//!
//! # Responsibility
//! - Map natural keys from source rows to canonical entities, creating them
//!   on first sight.
//! - Cache departments and publications for the lifetime of one run.
//!
//! # Invariants
//! - At most one department per exact name and one publication per
//!   `(kind, title)` is ever created by a resolver.
//! - Faculty are never cached; each lookup reads the store so link sets are
//!   current.

use crate::model::department::Department;
use crate::model::faculty::Faculty;
use crate::model::publication::{Publication, PublicationKind, PublicationSource};
use crate::repo::department_repo::DepartmentRepository;
use crate::repo::faculty_repo::FacultyRepository;
use crate::repo::publication_repo::PublicationRepository;
use crate::repo::{RepoResult, Resolved};
use crate::service::slug::unique_department_slug;
use crate::text::normalize::extract_keywords;
use log::{debug, info};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Get-or-create front for the three entity repositories.
pub struct EntityResolver<'r, D, F, P> {
    departments: &'r D,
    faculty: &'r F,
    publications: &'r P,
    department_cache: HashMap<String, Department>,
    publication_cache: HashMap<(PublicationKind, String), Publication>,
}

impl<'r, D, F, P> EntityResolver<'r, D, F, P>
where
    D: DepartmentRepository,
    F: FacultyRepository,
    P: PublicationRepository,
{
    pub fn new(departments: &'r D, faculty: &'r F, publications: &'r P) -> Self {
        Self {
            departments,
            faculty,
            publications,
            department_cache: HashMap::new(),
            publication_cache: HashMap::new(),
        }
    }

    /// Resolves a department that already passed classification.
    ///
    /// New departments get a unique slug, an inferred type and
    /// `is_target_discipline = true`.
    pub fn resolve_department(&mut self, name: &str) -> RepoResult<Resolved<Department>> {
        if let Some(cached) = self.department_cache.get(name) {
            return Ok(Resolved::existing(cached.clone()));
        }

        let resolved = self.departments.get_or_create_department(name, |repo| {
            let slug = unique_department_slug(repo, name)?;
            Ok(Department::new(name, slug, true))
        })?;
        if resolved.created {
            info!(
                "event=department_create module=resolver status=ok slug={} type={}",
                resolved.entity.slug,
                resolved.entity.kind.as_str()
            );
        }

        self.department_cache
            .insert(name.to_string(), resolved.entity.clone());
        Ok(resolved)
    }

    /// Resolves a faculty by exact `(name, position)`.
    ///
    /// A new faculty starts with empty link sets; `research_interest` and the
    /// raw affiliation are only used on creation.
    pub fn resolve_faculty(
        &mut self,
        name: &str,
        position: Option<&str>,
        research_interest: &str,
        raw_affiliation: &str,
    ) -> RepoResult<Resolved<Faculty>> {
        let resolved = self.faculty.get_or_create_faculty(name, position, || {
            let research_interest = if research_interest.is_empty() {
                None
            } else {
                Some(research_interest.to_string())
            };
            Faculty::new(
                name,
                position.map(str::to_string),
                research_interest,
                raw_affiliation,
            )
        })?;

        if resolved.created {
            info!(
                "event=faculty_create module=resolver status=ok id={}",
                resolved.entity.id
            );
        } else {
            debug!(
                "event=faculty_resolve module=resolver status=existing id={}",
                resolved.entity.id
            );
        }
        Ok(resolved)
    }

    /// Resolves a publication by `(kind, title)`.
    ///
    /// The returned entity is the cached copy, so author additions made by
    /// the caller are visible to later rows of the same run.
    pub fn resolve_publication(
        &mut self,
        kind: PublicationKind,
        title: &str,
        source: PublicationSource,
    ) -> RepoResult<Resolved<&mut Publication>> {
        let key = (kind, title.to_string());
        match self.publication_cache.entry(key) {
            Entry::Occupied(entry) => Ok(Resolved::existing(entry.into_mut())),
            Entry::Vacant(entry) => {
                let publications = self.publications;
                let resolved = publications.get_or_create_publication(title, kind, || {
                    let mut publication = Publication::new(kind, title, extract_keywords(title));
                    publication.source = Some(source);
                    publication
                })?;
                if resolved.created {
                    info!(
                        "event=publication_create module=resolver status=ok kind={} row={} keywords={}",
                        kind.as_str(),
                        source.sheet_row,
                        resolved.entity.keywords.len()
                    );
                }

                let created = resolved.created;
                Ok(Resolved {
                    entity: entry.insert(resolved.entity),
                    created,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EntityResolver;
    use crate::db::open_db_in_memory;
    use crate::model::department::DepartmentType;
    use crate::model::publication::{PublicationKind, PublicationSource};
    use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
    use crate::repo::faculty_repo::{FacultyRepository, SqliteFacultyRepository};
    use crate::repo::publication_repo::{PublicationRepository, SqlitePublicationRepository};

    #[test]
    fn department_is_created_once_per_name() {
        let conn = open_db_in_memory().unwrap();
        let departments = SqliteDepartmentRepository::new(&conn);
        let faculty = SqliteFacultyRepository::new(&conn);
        let publications = SqlitePublicationRepository::new(&conn);
        let mut resolver = EntityResolver::new(&departments, &faculty, &publications);

        let first = resolver
            .resolve_department("School of Computer Science")
            .unwrap();
        let second = resolver
            .resolve_department("School of Computer Science")
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.entity.id, second.entity.id);
        assert_eq!(first.entity.kind, DepartmentType::School);
        assert_eq!(first.entity.slug, "school-of-computer-science");
        assert!(first.entity.is_target_discipline);
        assert_eq!(departments.count_departments().unwrap(), 1);
    }

    #[test]
    fn fresh_resolver_finds_departments_in_store() {
        let conn = open_db_in_memory().unwrap();
        let departments = SqliteDepartmentRepository::new(&conn);
        let faculty = SqliteFacultyRepository::new(&conn);
        let publications = SqlitePublicationRepository::new(&conn);

        let id = EntityResolver::new(&departments, &faculty, &publications)
            .resolve_department("Data Science Group")
            .unwrap()
            .entity
            .id;
        let again = EntityResolver::new(&departments, &faculty, &publications)
            .resolve_department("Data Science Group")
            .unwrap();

        assert!(!again.created);
        assert_eq!(again.entity.id, id);
    }

    #[test]
    fn faculty_identity_includes_position() {
        let conn = open_db_in_memory().unwrap();
        let departments = SqliteDepartmentRepository::new(&conn);
        let faculty = SqliteFacultyRepository::new(&conn);
        let publications = SqlitePublicationRepository::new(&conn);
        let mut resolver = EntityResolver::new(&departments, &faculty, &publications);

        let professor = resolver
            .resolve_faculty("Ada Lovelace", Some("Professor"), "Engines", "CS")
            .unwrap();
        let same = resolver
            .resolve_faculty("Ada Lovelace", Some("Professor"), "Other", "Other")
            .unwrap();
        let lecturer = resolver
            .resolve_faculty("Ada Lovelace", Some("Lecturer"), "", "")
            .unwrap();

        assert!(professor.created);
        assert!(!same.created);
        assert_eq!(same.entity.research_interest.as_deref(), Some("Engines"));
        assert!(lecturer.created);
        assert_eq!(lecturer.entity.research_interest, None);
        assert_eq!(faculty.count_faculty().unwrap(), 2);
    }

    #[test]
    fn publication_cache_keeps_author_additions() {
        let conn = open_db_in_memory().unwrap();
        let departments = SqliteDepartmentRepository::new(&conn);
        let faculty = SqliteFacultyRepository::new(&conn);
        let publications = SqlitePublicationRepository::new(&conn);
        let mut resolver = EntityResolver::new(&departments, &faculty, &publications);
        let source = PublicationSource {
            sheet_row: 2,
            kind: PublicationKind::Article,
        };
        let author = uuid::Uuid::new_v4();

        let title = "Graph Learning at Scale";
        let created = resolver
            .resolve_publication(PublicationKind::Article, title, source)
            .unwrap();
        assert!(created.created);
        assert_eq!(created.entity.keywords, vec!["graph", "learning", "scale"]);
        assert_eq!(created.entity.source, Some(source));
        created.entity.add_author(author);

        let cached = resolver
            .resolve_publication(PublicationKind::Article, title, source)
            .unwrap();
        assert!(!cached.created);
        assert!(cached.entity.has_author(author));

        let conference = resolver
            .resolve_publication(PublicationKind::Conference, title, source)
            .unwrap();
        assert!(conference.created);
        assert_eq!(publications.count_publications().unwrap(), 2);
    }
}

//! Bulk reconciliation of a faculty sheet into the directory store.
//!
//! # Responsibility
//! - Walk source rows in order and merge them into canonical entities.
//! - Persist only relationship additions; never remove or overwrite.
//! - Report what a run created as an [`ImportSummary`].
//!
//! # Invariants
//! - Re-running over an unchanged sheet adds nothing.
//! - A store error aborts the run; rows already reconciled stay committed.
//! - Rows are processed strictly one after another.

use crate::config::{ConfigError, ImportOptions};
use crate::db::DbError;
use crate::model::faculty::FacultyId;
use crate::model::publication::{PublicationId, PublicationKind, PublicationSource};
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::faculty_repo::{FacultyRepository, SqliteFacultyRepository};
use crate::repo::publication_repo::{PublicationRepository, SqlitePublicationRepository};
use crate::repo::RepoError;
use crate::service::resolver::EntityResolver;
use crate::source::{SourceError, SourceRow, SourceTable};
use crate::text::classify::DepartmentClassifier;
use crate::text::normalize::{parse_department_list, parse_publication_titles};
use log::{debug, error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors that end an import run.
#[derive(Debug)]
pub enum ImportError {
    Source(SourceError),
    Config(ConfigError),
    /// The store could not be opened or migrated.
    Open(DbError),
    Store(RepoError),
}

impl ImportError {
    /// `true` for failures detected before any row was reconciled.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Config(_) | Self::Open(_))
    }
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source(err) => write!(f, "source error: {err}"),
            Self::Config(err) => write!(f, "config error: {err}"),
            Self::Open(err) => write!(f, "cannot open store: {err}"),
            Self::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Open(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SourceError> for ImportError {
    fn from(value: SourceError) -> Self {
        Self::Source(value)
    }
}

impl From<ConfigError> for ImportError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(RepoError::from(value))
    }
}

/// Counters for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows_read: u64,
    pub rows_processed: u64,
    pub rows_skipped: u64,
    pub departments_created: u64,
    pub departments_discarded: u64,
    pub faculty_created: u64,
    /// Existing faculty that gained at least one link.
    pub faculty_updated: u64,
    pub publications_created: u64,
    pub department_links_added: u64,
    pub article_links_added: u64,
    pub conference_links_added: u64,
    pub author_links_added: u64,
    pub duration_ms: u64,
    pub dry_run: bool,
}

impl ImportSummary {
    pub fn entities_created(&self) -> u64 {
        self.departments_created + self.faculty_created + self.publications_created
    }

    pub fn relationships_added(&self) -> u64 {
        self.department_links_added
            + self.article_links_added
            + self.conference_links_added
            + self.author_links_added
    }

    fn add_publication_links(&mut self, kind: PublicationKind, count: usize) {
        let count = count as u64;
        match kind {
            PublicationKind::Article => self.article_links_added += count,
            PublicationKind::Conference => self.conference_links_added += count,
        }
    }
}

impl Display for ImportSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lines: [(&str, u64); 14] = [
            ("rows read", self.rows_read),
            ("rows processed", self.rows_processed),
            ("rows skipped", self.rows_skipped),
            ("departments created", self.departments_created),
            ("departments discarded", self.departments_discarded),
            ("faculty created", self.faculty_created),
            ("faculty updated", self.faculty_updated),
            ("publications created", self.publications_created),
            ("department links added", self.department_links_added),
            ("article links added", self.article_links_added),
            ("conference links added", self.conference_links_added),
            ("author links added", self.author_links_added),
            ("entities created", self.entities_created()),
            ("relationships added", self.relationships_added()),
        ];
        if self.dry_run {
            writeln!(f, "dry run: no changes were kept")?;
        }
        for (label, value) in lines {
            writeln!(f, "{label:<24}{value:>8}")?;
        }
        write!(f, "{:<24}{:>6}ms", "duration", self.duration_ms)
    }
}

/// Reconciliation driver over the three entity repositories.
pub struct ImportService<D, F, P> {
    departments: D,
    faculty: F,
    publications: P,
    classifier: DepartmentClassifier,
}

impl<'conn>
    ImportService<
        SqliteDepartmentRepository<'conn>,
        SqliteFacultyRepository<'conn>,
        SqlitePublicationRepository<'conn>,
    >
{
    /// Driver over SQLite repositories sharing one connection or transaction.
    pub fn sqlite(conn: &'conn Connection, classifier: DepartmentClassifier) -> Self {
        Self::new(
            SqliteDepartmentRepository::new(conn),
            SqliteFacultyRepository::new(conn),
            SqlitePublicationRepository::new(conn),
            classifier,
        )
    }
}

impl<D, F, P> ImportService<D, F, P>
where
    D: DepartmentRepository,
    F: FacultyRepository,
    P: PublicationRepository,
{
    pub fn new(
        departments: D,
        faculty: F,
        publications: P,
        classifier: DepartmentClassifier,
    ) -> Self {
        Self {
            departments,
            faculty,
            publications,
            classifier,
        }
    }

    /// Reconciles every row of `table` in order.
    ///
    /// # Errors
    /// - `ImportError::Store` on the first repository failure; earlier rows
    ///   are not rolled back.
    pub fn run(&self, table: &SourceTable) -> Result<ImportSummary, ImportError> {
        let started = Instant::now();
        info!(
            "event=import_run module=import status=start rows={}",
            table.rows.len()
        );

        let mut resolver =
            EntityResolver::new(&self.departments, &self.faculty, &self.publications);
        let mut summary = ImportSummary {
            rows_read: table.rows_read() as u64,
            rows_skipped: table.blank_rows as u64,
            ..ImportSummary::default()
        };

        for row in &table.rows {
            if row.name.is_empty() {
                info!(
                    "event=import_row module=import status=skipped row={} reason=empty_name",
                    row.sheet_row
                );
                summary.rows_skipped += 1;
                continue;
            }

            if let Err(err) = self.reconcile_row(&mut resolver, row, &mut summary) {
                error!(
                    "event=import_run module=import status=error row={} error={}",
                    row.sheet_row, err
                );
                return Err(err.into());
            }
            summary.rows_processed += 1;
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "event=import_run module=import status=ok processed={} skipped={} created={} links={} duration_ms={}",
            summary.rows_processed,
            summary.rows_skipped,
            summary.entities_created(),
            summary.relationships_added(),
            summary.duration_ms
        );
        Ok(summary)
    }

    fn reconcile_row(
        &self,
        resolver: &mut EntityResolver<'_, D, F, P>,
        row: &SourceRow,
        summary: &mut ImportSummary,
    ) -> Result<(), RepoError> {
        let mut department_ids = Vec::new();
        for name in parse_department_list(&row.departmental_affiliation) {
            if !self.classifier.is_target_discipline(&name) {
                debug!(
                    "event=department_discard module=import status=skipped row={} name={}",
                    row.sheet_row, name
                );
                summary.departments_discarded += 1;
                continue;
            }
            let resolved = resolver.resolve_department(&name)?;
            if resolved.created {
                summary.departments_created += 1;
            }
            department_ids.push(resolved.entity.id);
        }

        let resolved = resolver.resolve_faculty(
            &row.name,
            row.position(),
            &row.research_interest,
            &row.departmental_affiliation,
        )?;
        let faculty_created = resolved.created;
        let mut faculty = resolved.entity;
        if faculty_created {
            summary.faculty_created += 1;
        }

        let mut links_added = 0;
        let new_departments = faculty.merge_departments(&department_ids);
        if !new_departments.is_empty() {
            let added = self
                .faculty
                .append_faculty_departments(faculty.id, &new_departments)?;
            summary.department_links_added += added as u64;
            links_added += added;
        }

        for kind in [PublicationKind::Article, PublicationKind::Conference] {
            let cell = match kind {
                PublicationKind::Article => &row.article,
                PublicationKind::Conference => &row.conference_paper,
            };
            let publication_ids =
                self.link_publications(resolver, row, kind, cell, faculty.id, summary)?;

            let new_publications = faculty.merge_publications(kind, &publication_ids);
            if !new_publications.is_empty() {
                let added = self
                    .faculty
                    .append_faculty_publications(faculty.id, kind, &new_publications)?;
                summary.add_publication_links(kind, added);
                links_added += added;
            }
        }

        if !faculty_created && links_added > 0 {
            summary.faculty_updated += 1;
        }
        debug!(
            "event=import_row module=import status=ok row={} faculty_created={} links_added={}",
            row.sheet_row, faculty_created, links_added
        );
        Ok(())
    }

    /// Resolves the titles of one publication cell and records authorship.
    fn link_publications(
        &self,
        resolver: &mut EntityResolver<'_, D, F, P>,
        row: &SourceRow,
        kind: PublicationKind,
        cell: &str,
        faculty_id: FacultyId,
        summary: &mut ImportSummary,
    ) -> Result<Vec<PublicationId>, RepoError> {
        let source = PublicationSource {
            sheet_row: row.sheet_row,
            kind,
        };
        let mut publication_ids = Vec::new();

        for title in parse_publication_titles(cell) {
            let resolved = resolver.resolve_publication(kind, &title, source)?;
            if resolved.created {
                summary.publications_created += 1;
            }
            let publication = resolved.entity;
            if publication.add_author(faculty_id)
                && self
                    .publications
                    .append_publication_author(publication.id, faculty_id)?
            {
                summary.author_links_added += 1;
            }
            publication_ids.push(publication.id);
        }

        Ok(publication_ids)
    }
}

/// Runs one import over SQLite, honouring `options`.
///
/// A dry run reconciles inside a transaction and rolls it back, so the
/// summary reports what would have changed.
pub fn import_table(
    conn: &mut Connection,
    table: &SourceTable,
    classifier: DepartmentClassifier,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError> {
    if !options.dry_run {
        return ImportService::sqlite(conn, classifier).run(table);
    }

    let tx = conn.transaction()?;
    let mut summary = ImportService::sqlite(&tx, classifier).run(table)?;
    tx.rollback()?;
    summary.dry_run = true;
    info!("event=import_dry_run module=import status=rolled_back");
    Ok(summary)
}

//! Faculty repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up faculty by the exact `(name, position)` natural key.
//! - Persist faculty rows and append department/publication links.
//!
//! # Invariants
//! - A missing position is its own key value (`position IS NULL`).
//! - Link appends are idempotent (`INSERT OR IGNORE`) and never reorder or
//!   remove existing links.

use crate::model::department::DepartmentId;
use crate::model::faculty::{Faculty, FacultyId};
use crate::model::publication::{PublicationId, PublicationKind};
use crate::repo::{count_rows, parse_uuid, query_uuid_list, RepoError, RepoResult, Resolved};
use rusqlite::{params, Connection, Row};
use std::collections::HashSet;
use uuid::Uuid;

const FACULTY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    position,
    research_interest,
    raw_department_affiliation
FROM faculty";

/// Repository interface for faculty lookups, inserts and link appends.
pub trait FacultyRepository {
    fn find_faculty(&self, name: &str, position: Option<&str>) -> RepoResult<Option<Faculty>>;
    fn get_faculty(&self, id: FacultyId) -> RepoResult<Option<Faculty>>;
    /// Inserts the faculty row together with any links already in its sets.
    fn create_faculty(&self, faculty: &Faculty) -> RepoResult<FacultyId>;
    /// Appends department links; returns how many were actually new.
    fn append_faculty_departments(
        &self,
        id: FacultyId,
        department_ids: &[DepartmentId],
    ) -> RepoResult<usize>;
    /// Appends links into the article or conference-paper slot.
    fn append_faculty_publications(
        &self,
        id: FacultyId,
        kind: PublicationKind,
        publication_ids: &[PublicationId],
    ) -> RepoResult<usize>;
    /// Department ids in link insertion order.
    fn list_department_ids(&self, id: FacultyId) -> RepoResult<Vec<DepartmentId>>;
    /// Publication ids of one slot in link insertion order.
    fn list_publication_ids(
        &self,
        id: FacultyId,
        kind: PublicationKind,
    ) -> RepoResult<Vec<PublicationId>>;
    fn count_faculty(&self) -> RepoResult<u64>;

    /// Finds a faculty by natural key, or inserts the one built by `build`.
    fn get_or_create_faculty<F>(
        &self,
        name: &str,
        position: Option<&str>,
        build: F,
    ) -> RepoResult<Resolved<Faculty>>
    where
        Self: Sized,
        F: FnOnce() -> Faculty,
    {
        if let Some(existing) = self.find_faculty(name, position)? {
            return Ok(Resolved::existing(existing));
        }

        let faculty = build();
        self.create_faculty(&faculty)?;
        Ok(Resolved::created(faculty))
    }
}

/// SQLite-backed faculty repository.
pub struct SqliteFacultyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFacultyRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn load_links(&self, mut faculty: Faculty) -> RepoResult<Faculty> {
        faculty.department_ids = self
            .list_department_ids(faculty.id)?
            .into_iter()
            .collect();
        faculty.article_ids = self
            .list_publication_ids(faculty.id, PublicationKind::Article)?
            .into_iter()
            .collect();
        faculty.conference_paper_ids = self
            .list_publication_ids(faculty.id, PublicationKind::Conference)?
            .into_iter()
            .collect();
        Ok(faculty)
    }

    fn touch(&self, id: FacultyId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE faculty
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl FacultyRepository for SqliteFacultyRepository<'_> {
    fn find_faculty(&self, name: &str, position: Option<&str>) -> RepoResult<Option<Faculty>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FACULTY_SELECT_SQL}
             WHERE name = ?1
               AND position IS ?2
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![name, position])?;
        let faculty = match rows.next()? {
            Some(row) => parse_faculty_row(row)?,
            None => return Ok(None),
        };
        Ok(Some(self.load_links(faculty)?))
    }

    fn get_faculty(&self, id: FacultyId) -> RepoResult<Option<Faculty>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FACULTY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let faculty = match rows.next()? {
            Some(row) => parse_faculty_row(row)?,
            None => return Ok(None),
        };
        Ok(Some(self.load_links(faculty)?))
    }

    fn create_faculty(&self, faculty: &Faculty) -> RepoResult<FacultyId> {
        self.conn.execute(
            "INSERT INTO faculty (
                uuid,
                name,
                position,
                research_interest,
                raw_department_affiliation
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                faculty.id.to_string(),
                faculty.name.as_str(),
                faculty.position.as_deref(),
                faculty.research_interest.as_deref(),
                faculty.raw_department_affiliation.as_str(),
            ],
        )?;

        let departments = sorted(&faculty.department_ids);
        append_links(self.conn, LinkTable::Departments, faculty.id, &departments)?;
        for kind in [PublicationKind::Article, PublicationKind::Conference] {
            let publications = sorted(faculty.publication_ids(kind));
            append_links(
                self.conn,
                LinkTable::Publications(kind),
                faculty.id,
                &publications,
            )?;
        }

        Ok(faculty.id)
    }

    fn append_faculty_departments(
        &self,
        id: FacultyId,
        department_ids: &[DepartmentId],
    ) -> RepoResult<usize> {
        let added = append_links(self.conn, LinkTable::Departments, id, department_ids)?;
        if added > 0 {
            self.touch(id)?;
        }
        Ok(added)
    }

    fn append_faculty_publications(
        &self,
        id: FacultyId,
        kind: PublicationKind,
        publication_ids: &[PublicationId],
    ) -> RepoResult<usize> {
        let added = append_links(
            self.conn,
            LinkTable::Publications(kind),
            id,
            publication_ids,
        )?;
        if added > 0 {
            self.touch(id)?;
        }
        Ok(added)
    }

    fn list_department_ids(&self, id: FacultyId) -> RepoResult<Vec<DepartmentId>> {
        query_uuid_list(
            self.conn,
            "SELECT department_uuid
             FROM faculty_departments
             WHERE faculty_uuid = ?1
             ORDER BY seq ASC;",
            [id.to_string()],
            "faculty_departments.department_uuid",
        )
    }

    fn list_publication_ids(
        &self,
        id: FacultyId,
        kind: PublicationKind,
    ) -> RepoResult<Vec<PublicationId>> {
        query_uuid_list(
            self.conn,
            "SELECT publication_uuid
             FROM faculty_publications
             WHERE faculty_uuid = ?1
               AND slot = ?2
             ORDER BY seq ASC;",
            params![id.to_string(), kind.as_str()],
            "faculty_publications.publication_uuid",
        )
    }

    fn count_faculty(&self) -> RepoResult<u64> {
        count_rows(self.conn, "faculty")
    }
}

#[derive(Debug, Clone, Copy)]
enum LinkTable {
    Departments,
    Publications(PublicationKind),
}

fn append_links(
    conn: &Connection,
    table: LinkTable,
    faculty_id: FacultyId,
    targets: &[Uuid],
) -> RepoResult<usize> {
    let owner = faculty_id.to_string();
    let mut added = 0;
    for target in targets {
        added += match table {
            LinkTable::Departments => conn.execute(
                "INSERT OR IGNORE INTO faculty_departments (
                    faculty_uuid,
                    department_uuid,
                    seq
                 ) VALUES (
                    ?1,
                    ?2,
                    (SELECT IFNULL(MAX(seq), 0) + 1
                     FROM faculty_departments
                     WHERE faculty_uuid = ?1)
                 );",
                params![owner.as_str(), target.to_string()],
            )?,
            LinkTable::Publications(kind) => conn.execute(
                "INSERT OR IGNORE INTO faculty_publications (
                    faculty_uuid,
                    publication_uuid,
                    slot,
                    seq
                 ) VALUES (
                    ?1,
                    ?2,
                    ?3,
                    (SELECT IFNULL(MAX(seq), 0) + 1
                     FROM faculty_publications
                     WHERE faculty_uuid = ?1)
                 );",
                params![owner.as_str(), target.to_string(), kind.as_str()],
            )?,
        };
    }
    Ok(added)
}

// Sets carry no order; sort so a fresh insert is deterministic.
fn sorted(ids: &HashSet<Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.iter().copied().collect();
    ids.sort_unstable();
    ids
}

fn parse_faculty_row(row: &Row<'_>) -> RepoResult<Faculty> {
    let uuid_text: String = row.get("uuid")?;
    let mut faculty = Faculty::new(
        row.get::<_, String>("name")?,
        row.get("position")?,
        row.get("research_interest")?,
        row.get::<_, String>("raw_department_affiliation")?,
    );
    faculty.id = parse_uuid(&uuid_text, "faculty.uuid")?;
    Ok(faculty)
}

//! Publication repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up publications by the exact `(title, kind)` natural key.
//! - Persist publications, their keyword index rows and author links.
//! - Answer keyword lookups from the keyword index.
//!
//! # Invariants
//! - Author links are append-only; `seq` preserves first-linked order.
//! - Keywords are written once, on insert.

use crate::model::faculty::FacultyId;
use crate::model::publication::{Publication, PublicationId, PublicationKind, PublicationSource};
use crate::repo::{count_rows, parse_uuid, query_uuid_list, RepoError, RepoResult, Resolved};
use rusqlite::{params, Connection, Row};

const PUBLICATION_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    kind,
    keywords,
    year,
    venue,
    doi,
    url,
    source_row,
    source_column
FROM publications";

/// Repository interface for publication lookups, inserts and author links.
pub trait PublicationRepository {
    fn find_publication(
        &self,
        title: &str,
        kind: PublicationKind,
    ) -> RepoResult<Option<Publication>>;
    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>>;
    /// Inserts the publication row, its keywords and any initial authors.
    fn create_publication(&self, publication: &Publication) -> RepoResult<PublicationId>;
    /// Appends one author link; returns `false` when it already existed.
    fn append_publication_author(
        &self,
        id: PublicationId,
        faculty_id: FacultyId,
    ) -> RepoResult<bool>;
    /// Author ids in link insertion order.
    fn list_author_ids(&self, id: PublicationId) -> RepoResult<Vec<FacultyId>>;
    /// Ids of publications tagged with `keyword`, oldest first.
    fn list_publication_ids_by_keyword(&self, keyword: &str) -> RepoResult<Vec<PublicationId>>;
    fn count_publications(&self) -> RepoResult<u64>;

    /// Finds a publication by natural key, or inserts the one built by `build`.
    fn get_or_create_publication<F>(
        &self,
        title: &str,
        kind: PublicationKind,
        build: F,
    ) -> RepoResult<Resolved<Publication>>
    where
        Self: Sized,
        F: FnOnce() -> Publication,
    {
        if let Some(existing) = self.find_publication(title, kind)? {
            return Ok(Resolved::existing(existing));
        }

        let publication = build();
        self.create_publication(&publication)?;
        Ok(Resolved::created(publication))
    }
}

/// SQLite-backed publication repository.
pub struct SqlitePublicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePublicationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn with_authors(&self, mut publication: Publication) -> RepoResult<Publication> {
        publication.authors = self
            .list_author_ids(publication.id)?
            .into_iter()
            .collect();
        Ok(publication)
    }
}

impl PublicationRepository for SqlitePublicationRepository<'_> {
    fn find_publication(
        &self,
        title: &str,
        kind: PublicationKind,
    ) -> RepoResult<Option<Publication>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PUBLICATION_SELECT_SQL}
             WHERE title = ?1
               AND kind = ?2;"
        ))?;
        let mut rows = stmt.query(params![title, kind.as_str()])?;
        let publication = match rows.next()? {
            Some(row) => parse_publication_row(row)?,
            None => return Ok(None),
        };
        Ok(Some(self.with_authors(publication)?))
    }

    fn get_publication(&self, id: PublicationId) -> RepoResult<Option<Publication>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLICATION_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let publication = match rows.next()? {
            Some(row) => parse_publication_row(row)?,
            None => return Ok(None),
        };
        Ok(Some(self.with_authors(publication)?))
    }

    fn create_publication(&self, publication: &Publication) -> RepoResult<PublicationId> {
        let keywords_json = serde_json::to_string(&publication.keywords).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode publication keywords: {err}"))
        })?;
        let id_text = publication.id.to_string();

        self.conn.execute(
            "INSERT INTO publications (
                uuid,
                title,
                kind,
                keywords,
                year,
                venue,
                doi,
                url,
                source_row,
                source_column
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                id_text.as_str(),
                publication.title.as_str(),
                publication.kind.as_str(),
                keywords_json,
                publication.year,
                publication.venue.as_deref(),
                publication.doi.as_deref(),
                publication.url.as_deref(),
                publication.source.map(|source| i64::from(source.sheet_row)),
                publication.source.map(|source| source.kind.column_label()),
            ],
        )?;

        for keyword in &publication.keywords {
            self.conn.execute(
                "INSERT OR IGNORE INTO publication_keywords (publication_uuid, keyword)
                 VALUES (?1, ?2);",
                params![id_text.as_str(), keyword.as_str()],
            )?;
        }

        let mut authors: Vec<FacultyId> = publication.authors.iter().copied().collect();
        authors.sort_unstable();
        for author in authors {
            self.append_publication_author(publication.id, author)?;
        }

        Ok(publication.id)
    }

    fn append_publication_author(
        &self,
        id: PublicationId,
        faculty_id: FacultyId,
    ) -> RepoResult<bool> {
        let owner = id.to_string();
        let added = self.conn.execute(
            "INSERT OR IGNORE INTO publication_authors (publication_uuid, faculty_uuid, seq)
             VALUES (
                ?1,
                ?2,
                (SELECT IFNULL(MAX(seq), 0) + 1
                 FROM publication_authors
                 WHERE publication_uuid = ?1)
             );",
            params![owner.as_str(), faculty_id.to_string()],
        )?;

        if added > 0 {
            let changed = self.conn.execute(
                "UPDATE publications
                 SET updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                [owner.as_str()],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }
        }

        Ok(added > 0)
    }

    fn list_author_ids(&self, id: PublicationId) -> RepoResult<Vec<FacultyId>> {
        query_uuid_list(
            self.conn,
            "SELECT faculty_uuid
             FROM publication_authors
             WHERE publication_uuid = ?1
             ORDER BY seq ASC;",
            [id.to_string()],
            "publication_authors.faculty_uuid",
        )
    }

    fn list_publication_ids_by_keyword(&self, keyword: &str) -> RepoResult<Vec<PublicationId>> {
        query_uuid_list(
            self.conn,
            "SELECT p.uuid
             FROM publication_keywords k
             JOIN publications p ON p.uuid = k.publication_uuid
             WHERE k.keyword = ?1
             ORDER BY p.created_at ASC, p.rowid ASC;",
            [keyword.to_lowercase()],
            "publication_keywords.publication_uuid",
        )
    }

    fn count_publications(&self) -> RepoResult<u64> {
        count_rows(self.conn, "publications")
    }
}

fn parse_publication_row(row: &Row<'_>) -> RepoResult<Publication> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "publications.uuid")?;

    let kind_text: String = row.get("kind")?;
    let kind = PublicationKind::parse(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid publication kind `{kind_text}` in publications.kind"
        ))
    })?;

    let keywords_text: String = row.get("keywords")?;
    let keywords: Vec<String> = serde_json::from_str(&keywords_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid keywords `{keywords_text}` in publications.keywords: {err}"
        ))
    })?;

    let source_row: Option<i64> = row.get("source_row")?;
    let source_column: Option<String> = row.get("source_column")?;
    let source = match (source_row, source_column) {
        (Some(sheet_row), Some(column)) => {
            let sheet_row = u32::try_from(sheet_row).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid source row `{sheet_row}` in publications.source_row"
                ))
            })?;
            let kind = PublicationKind::from_column_label(&column).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid source column `{column}` in publications.source_column"
                ))
            })?;
            Some(PublicationSource { sheet_row, kind })
        }
        _ => None,
    };

    let mut publication = Publication::new(kind, row.get::<_, String>("title")?, keywords);
    publication.id = id;
    publication.year = row.get("year")?;
    publication.venue = row.get("venue")?;
    publication.doi = row.get("doi")?;
    publication.url = row.get("url")?;
    publication.source = source;
    Ok(publication)
}

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-entity store contracts consumed by reconciliation.
//! - Isolate SQLite query details from service orchestration.
//! - Express get-or-create as find-then-create behind one method per entity.
//!
//! # Invariants
//! - Link tables are append-only from core; `seq` records insertion order.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

use crate::db::DbError;
use rusqlite::{Connection, Params};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod department_repo;
pub mod faculty_repo;
pub mod publication_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for directory persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a get-or-create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub entity: T,
    /// `true` when the entity did not exist and was inserted by this call.
    pub created: bool,
}

impl<T> Resolved<T> {
    pub fn existing(entity: T) -> Self {
        Self {
            entity,
            created: false,
        }
    }

    pub fn created(entity: T) -> Self {
        Self {
            entity,
            created: true,
        }
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Runs a single-column uuid query and returns ids in row order.
pub(crate) fn query_uuid_list<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    column: &str,
) -> RepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, column)?);
    }
    Ok(ids)
}

pub(crate) fn count_rows(conn: &Connection, table: &str) -> RepoResult<u64> {
    let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative row count for {table}")))
}

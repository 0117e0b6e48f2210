//! Department repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up departments by exact name or slug.
//! - Insert new departments; rows are never updated or deleted by import.
//!
//! # Invariants
//! - `name` and `slug` are both unique at the storage level.

use crate::model::department::{Department, DepartmentId, DepartmentType};
use crate::repo::{
    bool_to_int, count_rows, int_to_bool, parse_uuid, RepoError, RepoResult, Resolved,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const DEPARTMENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    slug,
    type,
    description,
    is_target_discipline
FROM departments";

/// Repository interface for department lookups and inserts.
pub trait DepartmentRepository {
    fn find_department_by_name(&self, name: &str) -> RepoResult<Option<Department>>;
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn department_slug_exists(&self, slug: &str) -> RepoResult<bool>;
    fn create_department(&self, department: &Department) -> RepoResult<DepartmentId>;
    fn count_departments(&self) -> RepoResult<u64>;

    /// Finds a department by exact name, or inserts the one built by `build`.
    ///
    /// `build` receives the repository so it can consult the store (slug
    /// probing) before the insert.
    fn get_or_create_department<F>(&self, name: &str, build: F) -> RepoResult<Resolved<Department>>
    where
        Self: Sized,
        F: FnOnce(&Self) -> RepoResult<Department>,
    {
        if let Some(existing) = self.find_department_by_name(name)? {
            return Ok(Resolved::existing(existing));
        }

        let department = build(self)?;
        self.create_department(&department)?;
        Ok(Resolved::created(department))
    }
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, filter: &str, value: &str) -> RepoResult<Option<Department>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEPARTMENT_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_department_row(row)?));
        }
        Ok(None)
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn find_department_by_name(&self, name: &str) -> RepoResult<Option<Department>> {
        self.query_one("name", name)
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        self.query_one("uuid", &id.to_string())
    }

    fn department_slug_exists(&self, slug: &str) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM departments WHERE slug = ?1 LIMIT 1;",
                [slug],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_department(&self, department: &Department) -> RepoResult<DepartmentId> {
        self.conn.execute(
            "INSERT INTO departments (
                uuid,
                name,
                slug,
                type,
                description,
                is_target_discipline
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                department.id.to_string(),
                department.name.as_str(),
                department.slug.as_str(),
                department.kind.as_str(),
                department.description.as_deref(),
                bool_to_int(department.is_target_discipline),
            ],
        )?;

        Ok(department.id)
    }

    fn count_departments(&self) -> RepoResult<u64> {
        count_rows(self.conn, "departments")
    }
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "departments.uuid")?;

    let type_text: String = row.get("type")?;
    let kind = DepartmentType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid department type `{type_text}` in departments.type"
        ))
    })?;

    Ok(Department {
        id,
        name: row.get("name")?,
        slug: row.get("slug")?,
        kind,
        description: row.get("description")?,
        is_target_discipline: int_to_bool(
            row.get("is_target_discipline")?,
            "departments.is_target_discipline",
        )?,
    })
}

use facultydir_core::db::migrations::latest_version;
use facultydir_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "departments",
        "faculty",
        "publications",
        "faculty_departments",
        "faculty_publications",
        "publication_authors",
        "publication_keywords",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO publication_authors (publication_uuid, faculty_uuid, seq)
         VALUES ('missing-publication', 'missing-faculty', 1);",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn faculty_natural_key_treats_null_position_as_one_value() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO faculty (
                      uuid,
                      name,
                      position,
                      raw_department_affiliation,
                      created_at,
                      updated_at
                  ) VALUES (?1, 'Ada Lovelace', NULL, '', 0, 0);";
    conn.execute(insert, ["00000000-0000-0000-0000-000000000001"])
        .unwrap();
    assert!(conn
        .execute(insert, ["00000000-0000-0000-0000-000000000002"])
        .is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("directory.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "departments");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

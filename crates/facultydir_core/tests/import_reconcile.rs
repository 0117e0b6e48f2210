use facultydir_core::db::open_db_in_memory;
use facultydir_core::model::faculty::Faculty;
use facultydir_core::model::publication::PublicationKind;
use facultydir_core::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use facultydir_core::repo::faculty_repo::{FacultyRepository, SqliteFacultyRepository};
use facultydir_core::repo::publication_repo::{PublicationRepository, SqlitePublicationRepository};
use facultydir_core::source::{SourceColumn, SourceTable};
use facultydir_core::{
    import_table, DepartmentClassifier, ImportError, ImportOptions, ImportService, ImportSummary,
};
use rusqlite::Connection;

type Row<'a> = [&'a str; 6];

const SAMPLE: [Row<'static>; 3] = [
    [
        "Ada Lovelace",
        "Professor",
        "Analytical engines",
        "Department of Computer Science, Aston Business School",
        "1. Notes on the Analytical Engine\n2. Graph Learning at Scale",
        "1. Secure Boot for Embedded Devices",
    ],
    [
        "Alan Turing",
        "Reader",
        "Computability",
        "Department of Computer Science\nApplied AI Research Group",
        "1. Graph Learning at Scale",
        "",
    ],
    [
        "Grace Hopper",
        "",
        "Compilers",
        "Aston University",
        "",
        "1. Compilers for Everyone",
    ],
];

fn table(rows: &[Row<'_>]) -> SourceTable {
    let header: Vec<String> = SourceColumn::ALL
        .iter()
        .map(|column| column.label().to_string())
        .collect();
    let body = rows.iter().enumerate().map(|(index, row)| {
        let cells = row.iter().map(|cell| (*cell).to_string()).collect();
        (index as u32 + 2, cells)
    });
    SourceTable::from_cells(&header, body).unwrap()
}

fn run(conn: &Connection, rows: &[Row<'_>]) -> ImportSummary {
    ImportService::sqlite(conn, DepartmentClassifier::default())
        .run(&table(rows))
        .unwrap()
}

fn table_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn store_counts(conn: &Connection) -> Vec<i64> {
    [
        "departments",
        "faculty",
        "publications",
        "faculty_departments",
        "faculty_publications",
        "publication_authors",
    ]
    .iter()
    .map(|table| table_count(conn, table))
    .collect()
}

fn faculty(conn: &Connection, name: &str, position: Option<&str>) -> Faculty {
    SqliteFacultyRepository::new(conn)
        .find_faculty(name, position)
        .unwrap()
        .unwrap()
}

#[test]
fn first_import_creates_entities_and_links() {
    let conn = open_db_in_memory().unwrap();
    let summary = run(&conn, &SAMPLE);

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.rows_processed, 3);
    assert_eq!(summary.rows_skipped, 0);
    assert_eq!(summary.departments_created, 2);
    assert_eq!(summary.departments_discarded, 2);
    assert_eq!(summary.faculty_created, 3);
    assert_eq!(summary.publications_created, 4);
    assert_eq!(summary.department_links_added, 3);
    assert_eq!(summary.article_links_added, 3);
    assert_eq!(summary.conference_links_added, 2);
    assert_eq!(summary.author_links_added, 5);

    let hopper = faculty(&conn, "Grace Hopper", None);
    assert!(hopper.department_ids.is_empty());
    assert_eq!(hopper.raw_department_affiliation, "Aston University");

    let departments = SqliteDepartmentRepository::new(&conn);
    let cs = departments
        .find_department_by_name("Department of Computer Science")
        .unwrap()
        .unwrap();
    assert_eq!(cs.slug, "department-of-computer-science");
    assert!(departments
        .find_department_by_name("Aston Business School")
        .unwrap()
        .is_none());
}

#[test]
fn reimporting_same_rows_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    run(&conn, &SAMPLE);
    let after_first = store_counts(&conn);

    let second = run(&conn, &SAMPLE);
    assert_eq!(store_counts(&conn), after_first);
    assert_eq!(second.entities_created(), 0);
    assert_eq!(second.relationships_added(), 0);
    assert_eq!(second.faculty_updated, 0);
    assert_eq!(second.rows_processed, 3);
}

#[test]
fn shared_title_links_every_author_in_row_order() {
    let conn = open_db_in_memory().unwrap();
    run(&conn, &SAMPLE);

    let publications = SqlitePublicationRepository::new(&conn);
    let shared = publications
        .find_publication("Graph Learning at Scale", PublicationKind::Article)
        .unwrap()
        .unwrap();
    let lovelace = faculty(&conn, "Ada Lovelace", Some("Professor"));
    let turing = faculty(&conn, "Alan Turing", Some("Reader"));

    assert_eq!(
        publications.list_author_ids(shared.id).unwrap(),
        vec![lovelace.id, turing.id]
    );
    assert_eq!(shared.keywords, vec!["graph", "learning", "scale"]);
    let source = shared.source.unwrap();
    assert_eq!(source.sheet_row, 2);
    assert_eq!(source.kind, PublicationKind::Article);
    assert!(lovelace.article_ids.contains(&shared.id));
    assert!(turing.article_ids.contains(&shared.id));
}

#[test]
fn updated_sheet_only_accretes() {
    let conn = open_db_in_memory().unwrap();
    run(&conn, &SAMPLE);
    let turing_before = faculty(&conn, "Alan Turing", Some("Reader"));

    let mut updated = SAMPLE;
    updated[1][4] = "1. Graph Learning at Scale\n2. Morphogenesis Revisited";
    let summary = run(&conn, &updated);

    assert_eq!(summary.publications_created, 1);
    assert_eq!(summary.faculty_created, 0);
    assert_eq!(summary.faculty_updated, 1);
    assert_eq!(summary.article_links_added, 1);
    assert_eq!(summary.author_links_added, 1);

    let turing = faculty(&conn, "Alan Turing", Some("Reader"));
    assert_eq!(turing.id, turing_before.id);
    assert!(turing_before.article_ids.is_subset(&turing.article_ids));
    assert_eq!(turing.department_ids, turing_before.department_ids);

    let publications = SqlitePublicationRepository::new(&conn);
    let added = publications
        .find_publication("Morphogenesis Revisited", PublicationKind::Article)
        .unwrap()
        .unwrap();
    assert_eq!(
        publications.list_author_ids(added.id).unwrap(),
        vec![turing.id]
    );
    assert_eq!(
        SqliteFacultyRepository::new(&conn)
            .list_publication_ids(turing.id, PublicationKind::Article)
            .unwrap()
            .last(),
        Some(&added.id)
    );
}

#[test]
fn reappearing_faculty_merges_departments() {
    let conn = open_db_in_memory().unwrap();
    let base: Row<'_> = ["Ada Lovelace", "Professor", "", "Computer Science", "", ""];
    run(&conn, &[base]);

    let mut wider = base;
    wider[3] = "Computer Science, Data Science Group";
    let summary = run(&conn, &[wider]);
    assert_eq!(summary.department_links_added, 1);

    let departments = SqliteDepartmentRepository::new(&conn);
    let d1 = departments
        .find_department_by_name("Computer Science")
        .unwrap()
        .unwrap();
    let d2 = departments
        .find_department_by_name("Data Science Group")
        .unwrap()
        .unwrap();

    let lovelace = faculty(&conn, "Ada Lovelace", Some("Professor"));
    assert_eq!(
        SqliteFacultyRepository::new(&conn)
            .list_department_ids(lovelace.id)
            .unwrap(),
        vec![d1.id, d2.id]
    );

    // A narrower row never removes links.
    run(&conn, &[base]);
    let lovelace = faculty(&conn, "Ada Lovelace", Some("Professor"));
    assert_eq!(lovelace.department_ids.len(), 2);
}

#[test]
fn colliding_slugs_get_numbered_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    run(
        &conn,
        &[[
            "Ada Lovelace",
            "",
            "",
            "Computer Science, Computer Science!",
            "",
            "",
        ]],
    );

    let departments = SqliteDepartmentRepository::new(&conn);
    let plain = departments
        .find_department_by_name("Computer Science")
        .unwrap()
        .unwrap();
    let shouted = departments
        .find_department_by_name("Computer Science!")
        .unwrap()
        .unwrap();
    assert_eq!(plain.slug, "computer-science");
    assert_eq!(shouted.slug, "computer-science-2");
}

#[test]
fn repeated_title_in_one_cell_links_once() {
    let conn = open_db_in_memory().unwrap();
    let summary = run(
        &conn,
        &[[
            "Ada Lovelace",
            "",
            "",
            "",
            "1. Notes on the Analytical Engine\n2. Notes on the Analytical Engine",
            "",
        ]],
    );

    assert_eq!(summary.publications_created, 1);
    assert_eq!(summary.author_links_added, 1);
    assert_eq!(summary.article_links_added, 1);
    assert_eq!(table_count(&conn, "publication_authors"), 1);
}

#[test]
fn rows_without_name_are_skipped() {
    let conn = open_db_in_memory().unwrap();
    let summary = run(
        &conn,
        &[
            [
                "",
                "Professor",
                "",
                "Computer Science",
                "1. Orphaned Paper",
                "",
            ],
            ["", "", "", "", "", ""],
            SAMPLE[1],
        ],
    );

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.rows_skipped, 2);
    assert_eq!(summary.rows_processed, 1);
    assert_eq!(table_count(&conn, "faculty"), 1);
    assert!(SqlitePublicationRepository::new(&conn)
        .find_publication("Orphaned Paper", PublicationKind::Article)
        .unwrap()
        .is_none());
}

#[test]
fn store_failure_aborts_and_keeps_earlier_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE publication_authors;")
        .unwrap();

    let rows = [
        ["Alan Turing", "Reader", "", "Computer Science", "", ""],
        [
            "Ada Lovelace",
            "",
            "",
            "",
            "1. Notes on the Analytical Engine",
            "",
        ],
        ["Grace Hopper", "", "", "", "", ""],
    ];
    let err = ImportService::sqlite(&conn, DepartmentClassifier::default())
        .run(&table(&rows))
        .unwrap_err();

    assert!(matches!(err, ImportError::Store(_)));
    assert!(!err.is_configuration());

    let turing = faculty(&conn, "Alan Turing", Some("Reader"));
    assert_eq!(turing.department_ids.len(), 1);
    assert!(SqliteFacultyRepository::new(&conn)
        .find_faculty("Grace Hopper", None)
        .unwrap()
        .is_none());
}

#[test]
fn dry_run_reports_changes_without_keeping_them() {
    let mut conn = open_db_in_memory().unwrap();
    let options = ImportOptions { dry_run: true };

    let summary = import_table(
        &mut conn,
        &table(&SAMPLE),
        DepartmentClassifier::default(),
        &options,
    )
    .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.faculty_created, 3);
    assert_eq!(store_counts(&conn), vec![0, 0, 0, 0, 0, 0]);
    let departments = SqliteDepartmentRepository::new(&conn);
    assert_eq!(departments.count_departments().unwrap(), 0);
}

#[test]
fn committed_run_through_import_table_persists() {
    let mut conn = open_db_in_memory().unwrap();
    let summary = import_table(
        &mut conn,
        &table(&SAMPLE),
        DepartmentClassifier::default(),
        &ImportOptions::default(),
    )
    .unwrap();

    assert!(!summary.dry_run);
    assert_eq!(table_count(&conn, "faculty"), 3);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["faculty_created"], 3);
    assert_eq!(json["publications_created"], 4);
}

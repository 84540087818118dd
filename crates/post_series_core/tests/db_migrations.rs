use post_series_core::db::migrations::{latest_version, schema_version};
use post_series_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name;")
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    names
}

#[test]
fn fresh_store_is_fully_migrated() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let tables = table_names(&conn);
    for expected in ["item_meta", "item_series", "items", "series"] {
        assert!(tables.iter().any(|name| name == expected), "missing {expected}");
    }
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.db");

    {
        let conn = open_db(&path).unwrap();
        conn.execute("INSERT INTO series (name, slug) VALUES ('Guide', 'guide');", [])
            .unwrap();
    }

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    let slug: String = conn
        .query_row("SELECT slug FROM series;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(slug, "guide");
}

#[test]
fn store_from_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .pragma_update(None, "user_version", 999)
        .unwrap();

    match open_db(&path) {
        Err(DbError::SchemaTooNew { found, supported }) => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must not open"),
    }
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let orphan = conn.execute(
        "INSERT INTO item_series (item_id, series_id) VALUES (77, 88);",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn membership_is_unique_per_item_at_schema_level() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO items (id, title) VALUES (1, 'a');
         INSERT INTO series (id, name, slug) VALUES (1, 'one', 'one'), (2, 'two', 'two');
         INSERT INTO item_series (item_id, series_id) VALUES (1, 1);",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO item_series (item_id, series_id) VALUES (1, 2);",
        [],
    );
    assert!(duplicate.is_err());
}

use quarry_core::{Connection, Value};
use quarry_sqlite::SqliteStore;

fn init() -> SqliteStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SqliteStore::open_in_memory().unwrap();
    store
        .execute("CREATE TABLE \"people\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \"name\" TEXT, \"weight\" REAL);")
        .unwrap();
    store
}

#[test]
fn insert_assigns_rowids_in_sequence() {
    let store = init();
    let first = store
        .insert("people", &[("name", Value::from("ada"))])
        .unwrap();
    let second = store
        .insert("people", &[("name", Value::from("grace"))])
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[test]
fn insert_with_no_values_uses_defaults() {
    let store = init();
    let id = store.insert("people", &[]).unwrap();
    assert_eq!(id, 1);
    let mut cursor = store.query("SELECT \"name\" FROM \"people\"", &[]).unwrap();
    assert!(cursor.advance().unwrap());
    assert!(cursor.is_null(0));
}

#[test]
fn cursor_reads_typed_columns() {
    let store = init();
    store
        .insert(
            "people",
            &[("name", Value::from("ada")), ("weight", Value::from(61.5))],
        )
        .unwrap();
    let mut cursor = store.query("SELECT * FROM \"people\"", &[]).unwrap();
    assert!(cursor.advance().unwrap());
    let id = cursor.column_index("ID").unwrap();
    let name = cursor.column_index("name").unwrap();
    let weight = cursor.column_index("weight").unwrap();
    assert_eq!(cursor.get_i64(id).unwrap(), 1);
    assert_eq!(cursor.get_text(name).unwrap(), "ada");
    assert_eq!(cursor.get_f64(weight).unwrap(), 61.5);
    assert!(!cursor.advance().unwrap());
}

#[test]
fn query_binds_placeholders() {
    let store = init();
    store.insert("people", &[("name", Value::from("ada"))]).unwrap();
    store.insert("people", &[("name", Value::from("grace"))]).unwrap();
    let mut cursor = store
        .query(
            "SELECT \"id\" FROM \"people\" WHERE \"name\" = ?",
            &[Value::from("grace")],
        )
        .unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.get_i64(0).unwrap(), 2);
    assert!(!cursor.advance().unwrap());
}

#[test]
fn update_and_delete_report_affected_rows() {
    let store = init();
    store.insert("people", &[("name", Value::from("ada"))]).unwrap();
    store.insert("people", &[("name", Value::from("ada"))]).unwrap();
    store.insert("people", &[("name", Value::from("grace"))]).unwrap();
    let updated = store
        .update(
            "people",
            &[("name", Value::from("lovelace"))],
            "\"name\" = ?",
            &[Value::from("ada")],
        )
        .unwrap();
    assert_eq!(updated, 2);
    let deleted = store
        .delete("people", "\"name\" = ?", &[Value::from("lovelace")])
        .unwrap();
    assert_eq!(deleted, 2);
    let mut cursor = store.query("SELECT COUNT(*) FROM \"people\"", &[]).unwrap();
    assert!(cursor.advance().unwrap());
    assert_eq!(cursor.get_i64(0).unwrap(), 1);
}

#[test]
fn malformed_sql_surfaces_as_storage_error() {
    let store = init();
    let result = store.query("SELECT nothing FROM nowhere", &[]);
    assert!(matches!(result, Err(quarry_core::Error::Storage(..))));
}

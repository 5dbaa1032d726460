//! Rendered statements executed against a real SQLite database.

use oxide_dbal_core::dialect::Dialect;
use oxide_dbal_core::lock::LockBuilder;
use oxide_dbal_core::reader::DataReader;
use oxide_dbal_core::statement::{Delete, Filter, Insert, Operator, Select, SortOrder, Update};
use oxide_dbal_core::value::SqlValue;
use oxide_dbal_core::{Command, Connection, DataSource, DbalError};
use oxide_dbal_sqlite::SqliteConnection;

fn items(n: i64) -> SqliteConnection {
    let mut conn = SqliteConnection::memory().unwrap();
    conn.execute(Command::new(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL, data BLOB)",
    ))
    .unwrap();
    let insert = (1..=n).fold(Insert::new(Dialect::Sqlite).into_table("items"), |insert, id| {
        insert
            .next_row()
            .value("id", id)
            .value("name", format!("item {id}"))
    });
    if n > 0 {
        assert_eq!(insert.execute(&mut conn).unwrap(), u64::try_from(n).unwrap());
    }
    conn
}

fn ids(conn: &mut SqliteConnection) -> Vec<i64> {
    Select::new(Dialect::Sqlite)
        .column("id")
        .from("items")
        .order_by("id", SortOrder::Asc)
        .query(conn)
        .unwrap()
        .collect_records()
        .unwrap()
        .iter()
        .map(|r| r.get_as::<i64>("id").unwrap())
        .collect()
}

#[test]
fn values_convert_by_storage_class() {
    let mut conn = items(0);
    Insert::new(Dialect::Sqlite)
        .into_table("items")
        .columns(&["id", "name", "price", "data"])
        .value("id", 1)
        .value("name", "it's")
        .value("price", 2.5)
        .value("data", vec![0xde_u8, 0xad])
        .next_row()
        .value("id", 2)
        .value("name", "plain")
        .execute(&mut conn)
        .unwrap();

    let rows = Select::new(Dialect::Sqlite)
        .from("items")
        .order_by("id", SortOrder::Asc)
        .query(&mut conn)
        .unwrap()
        .collect_records()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&SqlValue::Int(1)));
    assert_eq!(rows[0].get("name"), Some(&SqlValue::Text(String::from("it's"))));
    assert_eq!(rows[0].get("price"), Some(&SqlValue::Float(2.5)));
    assert_eq!(rows[0].get("data"), Some(&SqlValue::Blob(vec![0xde, 0xad])));
    assert_eq!(rows[1].get("price"), Some(&SqlValue::Null));
    assert_eq!(
        rows[0].columns().collect::<Vec<_>>(),
        vec!["id", "name", "price", "data"]
    );
}

#[test]
fn bounded_delete_goes_through_rowid() {
    let mut conn = items(5);
    let affected = Delete::new(Dialect::Sqlite)
        .from("items")
        .where_clause("id", Operator::Gt, 1)
        .order_by("id", SortOrder::Desc)
        .limit(2)
        .execute(&mut conn)
        .unwrap();
    assert_eq!(affected, 2);
    assert_eq!(ids(&mut conn), vec![1, 2, 3]);
}

#[test]
fn bounded_update_with_offset() {
    let mut conn = items(4);
    let affected = Update::new(Dialect::Sqlite)
        .table("items")
        .set("name", "touched")
        .order_by("id", SortOrder::Asc)
        .limit(2)
        .offset(1)
        .execute(&mut conn)
        .unwrap();
    assert_eq!(affected, 2);

    let touched: Vec<i64> = Select::new(Dialect::Sqlite)
        .column("id")
        .from("items")
        .where_clause("name", Operator::Eq, "touched")
        .order_by("id", SortOrder::Asc)
        .query(&mut conn)
        .unwrap()
        .collect_records()
        .unwrap()
        .iter()
        .map(|r| r.get_as("id").unwrap())
        .collect();
    assert_eq!(touched, vec![2, 3]);
}

#[test]
fn select_with_offset_only() {
    let mut conn = items(5);
    let rows = Select::new(Dialect::Sqlite)
        .column("id")
        .from("items")
        .order_by("id", SortOrder::Asc)
        .offset(3)
        .query(&mut conn)
        .unwrap()
        .collect_records()
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn reader_dispose_leaves_rows_unread() {
    let mut conn = items(3);
    let mut reader = DataReader::new(&mut conn, Command::new("SELECT id FROM items")).unwrap();
    assert!(reader.read().unwrap());
    reader.dispose();
    reader.dispose();
    assert!(!reader.read().unwrap());
}

#[test]
fn rejected_statement_carries_the_driver_reason() {
    let mut conn = SqliteConnection::memory().unwrap();
    let err = Select::new(Dialect::Sqlite)
        .from("missing")
        .query(&mut conn)
        .unwrap_err();
    match err {
        DbalError::Query { message } => assert!(message.contains("no such table"), "{message}"),
        other => panic!("expected a query error, got {other:?}"),
    }
}

#[test]
fn rollback_discards_changes() {
    let mut conn = items(1);
    conn.begin_transaction().unwrap();
    Delete::new(Dialect::Sqlite).from("items").execute(&mut conn).unwrap();
    assert!(ids(&mut conn).is_empty());
    conn.rollback().unwrap();
    assert_eq!(ids(&mut conn), vec![1]);
}

#[test]
fn positional_parameters_are_bound() {
    let mut conn = items(3);
    let command = Command::with_params(
        "SELECT name FROM items WHERE id = ? OR name = ?",
        vec![SqlValue::Int(2), SqlValue::Text(String::from("item 3"))],
    );
    let names: Vec<String> = DataReader::new(&mut conn, command)
        .unwrap()
        .collect_records()
        .unwrap()
        .iter()
        .map(|r| r.get_as("name").unwrap())
        .collect();
    assert_eq!(names, vec!["item 2", "item 3"]);
}

#[test]
fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");

    let mut conn = SqliteConnection::file(&path).unwrap();
    conn.execute(Command::new("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)"))
        .unwrap();
    Insert::new(Dialect::Sqlite)
        .into_table("kv")
        .value("k", "greeting")
        .value("v", "hello")
        .execute(&mut conn)
        .unwrap();
    conn.close().unwrap();

    let source = DataSource::new("app", Dialect::Sqlite).database(path.to_string_lossy());
    let mut conn = SqliteConnection::open(source).unwrap();
    let mut reader = Select::new(Dialect::Sqlite)
        .column("v")
        .from("kv")
        .where_clause("k", Operator::Eq, "greeting")
        .query(&mut conn)
        .unwrap();
    assert!(reader.read().unwrap());
    assert_eq!(reader.record().unwrap().get_as::<String>("v").unwrap(), "hello");
}

#[test]
fn sqlite_cannot_build_table_locks() {
    assert!(LockBuilder::new(Dialect::Sqlite).is_err());
}

#[test]
fn test_native_handle_through_dyn_connection() {
    let mut sqlite = SqliteConnection::memory().unwrap();
    let conn: &mut dyn Connection = &mut sqlite;
    assert!(conn.resource_as::<String>().is_none());

    let native = conn
        .resource_as::<oxide_dbal_sqlite::NativeConnection>()
        .unwrap();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (n,): (i64,) = runtime
        .block_on(sqlx::query_as("SELECT 6 * 7").fetch_one(native))
        .unwrap();
    assert_eq!(n, 42);
}

//! Models persisted in a real SQLite database.

mod common;

use common::{Author, Book};
use oxide_dbal_core::dialect::Dialect;
use oxide_dbal_core::statement::{Filter, Operator, SortOrder};
use oxide_dbal_core::{Command, Connection};
use oxide_dbal_sqlite::SqliteConnection;
use oxide_orm::{Model, OrmError};

fn shelf() -> SqliteConnection {
    let mut conn = SqliteConnection::memory().unwrap();
    conn.execute(Command::new(
        "CREATE TABLE books (\
         id INTEGER PRIMARY KEY AUTOINCREMENT, \
         title TEXT NOT NULL, \
         pages INTEGER NOT NULL, \
         in_stock BOOLEAN NOT NULL)",
    ))
    .unwrap();
    for (title, pages) in [("Dune", 412), ("Emma", 474), ("Ulysses", 730)] {
        Book::objects()
            .insert(&mut conn, &Book::new(title, pages))
            .unwrap();
    }
    conn
}

#[test]
fn test_insert_assigns_primary_keys() {
    let mut conn = shelf();
    let books = Book::objects().all(&mut conn).unwrap();

    let ids: Vec<Option<i64>> = books.iter().map(|b| b.id).collect();
    assert_eq!(ids, [Some(1), Some(2), Some(3)]);
    assert!(books.iter().all(|b| b.in_stock == Some(true)));
    assert_eq!(Book::objects().count(&mut conn).unwrap(), 3);
}

#[test]
fn test_update_then_get() {
    let mut conn = shelf();
    let mut book = Book::objects().get(&mut conn, 2).unwrap();
    book.in_stock = Some(false);
    book.pages = 480;

    assert_eq!(Book::objects().update(&mut conn, &book).unwrap(), 1);
    let stored = Book::objects().get(&mut conn, 2).unwrap();
    assert_eq!(stored, book);
}

#[test]
fn test_delete_then_get_or_none() {
    let mut conn = shelf();
    let book = Book::objects().get(&mut conn, 1).unwrap();

    assert_eq!(Book::objects().delete(&mut conn, &book).unwrap(), 1);
    assert!(Book::objects().get_or_none(&mut conn, 1).unwrap().is_none());
    assert!(matches!(
        Book::objects().get(&mut conn, 1),
        Err(OrmError::NotFound)
    ));
    assert_eq!(Book::objects().count(&mut conn).unwrap(), 2);
}

#[test]
fn test_fetch_filtered_and_ordered() {
    let mut conn = shelf();
    let manager = Book::objects();
    let select = manager
        .select(Dialect::Sqlite)
        .where_clause("pages", Operator::Gt, 420)
        .order_by("pages", SortOrder::Desc);

    let titles: Vec<String> = manager
        .fetch(&mut conn, &select)
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, ["Ulysses", "Emma"]);
}

#[test]
fn test_missing_table_is_database_error() {
    let mut conn = SqliteConnection::memory().unwrap();
    assert!(matches!(
        Book::objects().count(&mut conn),
        Err(OrmError::Database(_))
    ));
}

#[test]
fn test_unique_column_is_enforced() {
    let mut conn = SqliteConnection::memory().unwrap();
    conn.execute(Command::new(
        "CREATE TABLE authors (id INTEGER PRIMARY KEY AUTOINCREMENT, email TEXT NOT NULL)",
    ))
    .unwrap();
    let authors = Author::objects();
    authors
        .insert(&mut conn, &Author::new(None, "ann@example.com"))
        .unwrap();
    authors
        .insert(&mut conn, &Author::new(None, "bob@example.com"))
        .unwrap();

    assert!(matches!(
        authors.insert(&mut conn, &Author::new(None, "ann@example.com")),
        Err(OrmError::Validation(_))
    ));
    assert_eq!(authors.update(&mut conn, &Author::new(Some(1), "ann@example.com")).unwrap(), 1);
    assert!(matches!(
        authors.update(&mut conn, &Author::new(Some(2), "ann@example.com")),
        Err(OrmError::Validation(_))
    ));
    assert_eq!(authors.count(&mut conn).unwrap(), 2);
}

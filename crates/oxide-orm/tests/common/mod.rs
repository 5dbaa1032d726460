#![allow(dead_code)]

use oxide_dbal_core::reader::{FromRecord, Record};
use oxide_dbal_core::value::SqlValue;
use oxide_orm::fields::{
    BigIntField, BooleanField, CharField, EmailField, FieldDef, FieldOptions, IntegerField,
};
use oxide_orm::Model;

/// A book on the shelf. `in_stock` left as `None` takes the column default.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Option<i64>,
    pub title: String,
    pub pages: i64,
    pub in_stock: Option<bool>,
}

impl Book {
    pub fn new(title: &str, pages: i64) -> Self {
        Self {
            id: None,
            title: String::from(title),
            pages,
            in_stock: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

impl FromRecord for Book {
    fn from_record(record: &Record) -> oxide_dbal_core::Result<Self> {
        Ok(Self {
            id: record.get_as("id")?,
            title: record.get_as("title")?,
            pages: record.get_as("pages")?,
            in_stock: record.get_as("in_stock")?,
        })
    }
}

impl Model for Book {
    const TABLE: &'static str = "books";

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new(
                "id",
                BigIntField::new().options(FieldOptions::new().primary_key(true)),
            ),
            FieldDef::new("title", CharField::new(100)),
            FieldDef::new("pages", IntegerField::new().range(1, 10_000)),
            FieldDef::new(
                "in_stock",
                BooleanField::new().options(FieldOptions::new().default_value(SqlValue::Bool(true))),
            ),
        ]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        let mut values = vec![
            ("id", self.id.map_or(SqlValue::Null, SqlValue::Int)),
            ("title", SqlValue::Text(self.title.clone())),
            ("pages", SqlValue::Int(self.pages)),
        ];
        if let Some(flag) = self.in_stock {
            values.push(("in_stock", SqlValue::Bool(flag)));
        }
        values
    }
}

/// Builds the record a database would return for a stored book.
pub fn book_record(id: i64, title: &str, pages: i64, in_stock: bool) -> Record {
    let mut record = Record::new();
    record.push("id", SqlValue::Int(id));
    record.push("title", SqlValue::Text(String::from(title)));
    record.push("pages", SqlValue::Int(pages));
    record.push("in_stock", SqlValue::Bool(in_stock));
    record
}

/// An author, identified by a unique email address.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: Option<i64>,
    pub email: String,
}

impl Author {
    pub fn new(id: Option<i64>, email: &str) -> Self {
        Self {
            id,
            email: String::from(email),
        }
    }
}

impl FromRecord for Author {
    fn from_record(record: &Record) -> oxide_dbal_core::Result<Self> {
        Ok(Self {
            id: record.get_as("id")?,
            email: record.get_as("email")?,
        })
    }
}

impl Model for Author {
    const TABLE: &'static str = "authors";

    fn fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new(
                "id",
                BigIntField::new().options(FieldOptions::new().primary_key(true)),
            ),
            FieldDef::new(
                "email",
                EmailField::new().options(FieldOptions::new().unique(true)),
            ),
        ]
    }

    fn values(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("id", self.id.map_or(SqlValue::Null, SqlValue::Int)),
            ("email", SqlValue::Text(self.email.clone())),
        ]
    }
}

/// Builds the single-row result of a `COUNT(*) AS count` query.
pub fn count_record(count: i64) -> Record {
    let mut record = Record::new();
    record.push("count", SqlValue::Int(count));
    record
}

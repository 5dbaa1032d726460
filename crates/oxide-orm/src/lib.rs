//! # oxide-orm
//!
//! A thin ORM over `oxide-dbal-core`.
//!
//! This crate provides:
//! - `Model` trait mapping a table to a Rust type
//! - `Manager` for fetching, inserting, updating and deleting objects
//! - Field types with validation
//!
//! Every statement goes through the core builders, so the same model runs on
//! any dialect the connection speaks.
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_dbal_core::mock::MockConnection;
//! use oxide_dbal_core::reader::{FromRecord, Record};
//! use oxide_dbal_core::value::SqlValue;
//! use oxide_dbal_core::Dialect;
//! use oxide_orm::fields::{BigIntField, CharField, FieldDef, FieldOptions};
//! use oxide_orm::Model;
//!
//! struct User {
//!     id: Option<i64>,
//!     username: String,
//! }
//!
//! impl FromRecord for User {
//!     fn from_record(record: &Record) -> oxide_dbal_core::Result<Self> {
//!         Ok(Self {
//!             id: record.get_as("id")?,
//!             username: record.get_as("username")?,
//!         })
//!     }
//! }
//!
//! impl Model for User {
//!     const TABLE: &'static str = "users";
//!
//!     fn fields() -> Vec<FieldDef> {
//!         vec![
//!             FieldDef::new("id", BigIntField::new().options(FieldOptions::new().primary_key(true))),
//!             FieldDef::new("username", CharField::new(150)),
//!         ]
//!     }
//!
//!     fn values(&self) -> Vec<(&'static str, SqlValue)> {
//!         vec![
//!             ("id", self.id.map_or(SqlValue::Null, SqlValue::Int)),
//!             ("username", SqlValue::Text(self.username.clone())),
//!         ]
//!     }
//! }
//!
//! let mut conn = MockConnection::new(Dialect::MySql);
//! let user = User { id: None, username: String::from("alice") };
//! User::objects().insert(&mut conn, &user).unwrap();
//! assert_eq!(
//!     conn.log(),
//!     ["INSERT INTO `users` (`username`) VALUES ('alice')"]
//! );
//! ```

pub mod fields;

mod error;
mod manager;
mod model;

pub use error::{OrmError, Result};
pub use manager::Manager;
pub use model::Model;

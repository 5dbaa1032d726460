//! Manager for database access.
//!
//! The manager renders every statement through the core builders in the
//! connection's dialect and hydrates rows through the data reader, so models
//! work unchanged on any supported engine.

use std::marker::PhantomData;

use oxide_dbal_core::connection::Connection;
use oxide_dbal_core::dialect::Dialect;
use oxide_dbal_core::statement::{Delete, Filter, Insert, Operator, Select, SortOrder, Update};
use oxide_dbal_core::value::{SqlValue, ToSqlValue};
use tracing::debug;

use crate::error::{OrmError, Result};
use crate::model::{resolve, Model};

/// Database access methods for a model.
///
/// Managers are stateless and can be created freely.
///
/// # Example
///
/// ```ignore
/// let mut conn = SqliteConnection::memory()?;
/// let book = Book::objects().get(&mut conn, 1)?;
/// let count = Book::objects().count(&mut conn)?;
/// ```
#[derive(Debug)]
pub struct Manager<M: Model> {
    _marker: PhantomData<fn() -> M>,
}

impl<M: Model> Clone for Manager<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Model> Copy for Manager<M> {}

impl<M: Model> Default for Manager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Manager<M> {
    /// Creates a new manager.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Returns a SELECT over every model column, for further filtering.
    #[must_use]
    pub fn select(&self, dialect: Dialect) -> Select {
        Select::new(dialect)
            .columns(&M::columns())
            .from(M::TABLE)
    }

    /// Runs a SELECT and hydrates every row.
    ///
    /// # Errors
    ///
    /// Returns the query or hydration error.
    pub fn fetch(&self, conn: &mut dyn Connection, select: &Select) -> Result<Vec<M>> {
        let models = select
            .query_as::<M>(conn)?
            .collect::<oxide_dbal_core::Result<Vec<M>>>()?;
        debug!(table = M::TABLE, rows = models.len(), "Fetched models");
        Ok(models)
    }

    /// Returns every object, ordered by primary key.
    ///
    /// # Errors
    ///
    /// Returns the query or hydration error.
    pub fn all(&self, conn: &mut dyn Connection) -> Result<Vec<M>> {
        let select = self
            .select(conn.dialect())
            .order_by(M::primary_key()?, SortOrder::Asc);
        self.fetch(conn, &select)
    }

    /// Gets an object by primary key.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `MultipleObjectsReturned` unless exactly one row
    /// matches.
    pub fn get<K: ToSqlValue>(&self, conn: &mut dyn Connection, pk: K) -> Result<M> {
        let select = self
            .select(conn.dialect())
            .where_clause(M::primary_key()?, Operator::Eq, pk)
            .limit(2);
        let mut models = self.fetch(conn, &select)?;
        match models.len() {
            0 => Err(OrmError::NotFound),
            1 => Ok(models.remove(0)),
            _ => Err(OrmError::MultipleObjectsReturned),
        }
    }

    /// Gets an object by primary key, returning `None` if not found.
    ///
    /// # Errors
    ///
    /// See [`Manager::get`]; `NotFound` becomes `Ok(None)`.
    pub fn get_or_none<K: ToSqlValue>(&self, conn: &mut dyn Connection, pk: K) -> Result<Option<M>> {
        match self.get(conn, pk) {
            Ok(model) => Ok(Some(model)),
            Err(OrmError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Returns the number of rows in the table.
    ///
    /// # Errors
    ///
    /// Returns the query error.
    pub fn count(&self, conn: &mut dyn Connection) -> Result<u64> {
        let select = Select::new(conn.dialect())
            .column_expr("COUNT(*)", Some("count"))
            .from(M::TABLE);
        count_rows(conn, &select)
    }

    /// Fails with `Validation` if a unique column already holds the value
    /// another row stores. `exclude` is the primary key of the row being
    /// updated.
    fn check_unique(
        &self,
        conn: &mut dyn Connection,
        values: &[(&'static str, SqlValue)],
        exclude: Option<(&str, &SqlValue)>,
    ) -> Result<()> {
        for def in M::fields() {
            if !def.field.options().unique || def.is_primary_key() {
                continue;
            }
            let Some((column, value)) = values
                .iter()
                .find(|(column, value)| *column == def.column && !value.is_null())
            else {
                continue;
            };
            let mut select = Select::new(conn.dialect())
                .column_expr("COUNT(*)", Some("count"))
                .from(M::TABLE)
                .where_clause(column, Operator::Eq, value);
            if let Some((pk, pk_value)) = exclude {
                select = select.where_clause(pk, Operator::Ne, pk_value);
            }
            if count_rows(conn, &select)? > 0 {
                debug!(table = M::TABLE, column = *column, "Unique value already taken");
                return Err(OrmError::Validation(format!(
                    "{column}: a row with this value already exists"
                )));
            }
        }
        Ok(())
    }

    /// Validates and inserts an object. A NULL primary key is left to the
    /// database.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a value fails its field, before any SQL is
    /// issued, or if a unique column already holds the value. Otherwise the
    /// query error.
    pub fn insert(&self, conn: &mut dyn Connection, model: &M) -> Result<u64> {
        let fields = M::fields();
        let values = resolve(&fields, model.values(), Some(true))?;
        self.check_unique(conn, &values, None)?;
        let row: Vec<(&str, SqlValue)> = values
            .into_iter()
            .filter(|(column, value)| {
                !(value.is_null()
                    && fields
                        .iter()
                        .any(|def| def.column == *column && def.is_primary_key()))
            })
            .collect();

        let columns: Vec<&str> = row.iter().map(|(column, _)| *column).collect();
        let affected = Insert::new(conn.dialect())
            .into_table(M::TABLE)
            .columns(&columns)
            .row(&row)
            .execute(conn)?;
        debug!(table = M::TABLE, affected, "Inserted model");
        Ok(affected)
    }

    /// Validates and updates an object by primary key.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the object has no primary key value, a value
    /// fails its field or another row holds a unique value. Otherwise the
    /// query error.
    pub fn update(&self, conn: &mut dyn Connection, model: &M) -> Result<u64> {
        let pk = M::primary_key()?;
        let pk_value = model.pk()?;
        if pk_value.is_null() {
            return Err(OrmError::Validation(format!(
                "{pk}: cannot update an object without primary key"
            )));
        }

        let values = resolve(&M::fields(), model.values(), Some(false))?;
        self.check_unique(conn, &values, Some((pk, &pk_value)))?;
        let update = values
            .into_iter()
            .filter(|(column, _)| *column != pk)
            .fold(Update::new(conn.dialect()).table(M::TABLE), |update, (column, value)| {
                update.set(column, value)
            })
            .where_clause(pk, Operator::Eq, pk_value);
        let affected = update.execute(conn)?;
        debug!(table = M::TABLE, affected, "Updated model");
        Ok(affected)
    }

    /// Deletes an object by primary key.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the object has no primary key value, or the
    /// query error.
    pub fn delete(&self, conn: &mut dyn Connection, model: &M) -> Result<u64> {
        let pk = M::primary_key()?;
        let pk_value = model.pk()?;
        if pk_value.is_null() {
            return Err(OrmError::Validation(format!(
                "{pk}: cannot delete an object without primary key"
            )));
        }
        let affected = Delete::new(conn.dialect())
            .from(M::TABLE)
            .where_clause(pk, Operator::Eq, pk_value)
            .execute(conn)?;
        debug!(table = M::TABLE, affected, "Deleted model");
        Ok(affected)
    }
}

/// Runs a single-row `COUNT(*) AS count` query.
fn count_rows(conn: &mut dyn Connection, select: &Select) -> Result<u64> {
    let mut reader = select.query(conn)?;
    let count = if reader.read()? {
        reader
            .record()
            .map(|record| record.get_as::<i64>("count"))
            .transpose()?
            .unwrap_or(0)
    } else {
        0
    };
    reader.dispose();
    Ok(u64::try_from(count).unwrap_or(0))
}

//! Data-source configuration.
//!
//! A data source describes how to reach one database. The core only reads its
//! dialect key; the remaining fields are consumed by connection crates when
//! building a native connection string, and `results` feeds the
//! [`MockConnection`](crate::mock::MockConnection) test double.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{DbalError, Result};
use crate::reader::Record;

/// Canned rows for one SQL text, as JSON objects.
pub type JsonRows = Vec<serde_json::Map<String, serde_json::Value>>;

/// Connection parameters for one database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    /// Name of the data source.
    pub id: String,
    /// Dialect key selecting the renderers.
    pub dialect: Dialect,
    /// Driver name, when a dialect has more than one.
    pub driver: Option<String>,
    /// Host name or file path.
    pub host: Option<String>,
    /// TCP port.
    pub port: Option<u16>,
    /// Database (or schema) name.
    pub database: Option<String>,
    /// User name.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Client character set.
    pub charset: Option<String>,
    /// Role to assume after connecting.
    pub role: Option<String>,
    /// Whether the connection should be kept open across requests.
    pub persistent: bool,
    /// Canned results keyed by exact SQL text.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, JsonRows>,
}

impl DataSource {
    /// Creates a data source for a dialect.
    #[must_use]
    pub fn new(id: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            id: id.into(),
            dialect,
            ..Self::default()
        }
    }

    /// Sets the database name.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Returns the canned rows for a SQL text, if any.
    #[must_use]
    pub fn result_rows(&self, sql: &str) -> Option<Vec<Record>> {
        self.results
            .get(sql)
            .map(|rows| rows.iter().map(Record::from_json).collect())
    }
}

/// A set of named data sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data sources by name.
    pub data_sources: BTreeMap<String, DataSource>,
    /// Name of the data source used when none is given.
    pub default: Option<String>,
}

impl Config {
    /// Parses a configuration from JSON.
    ///
    /// Data sources without an `id` take their map key.
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed input and `Config` when `default` names an
    /// unknown data source.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        for (name, source) in &mut config.data_sources {
            if source.id.is_empty() {
                source.id.clone_from(name);
            }
        }
        if let Some(default) = &config.default {
            if !config.data_sources.contains_key(default) {
                return Err(DbalError::Config(format!(
                    "default data source '{default}' is not defined"
                )));
            }
        }
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`Config::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Returns a data source by name.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an unknown name.
    pub fn data_source(&self, name: &str) -> Result<&DataSource> {
        self.data_sources
            .get(name)
            .ok_or_else(|| DbalError::Config(format!("unknown data source '{name}'")))
    }

    /// Returns the default data source.
    ///
    /// When no default is configured and exactly one data source exists, that
    /// one is returned.
    ///
    /// # Errors
    ///
    /// Returns `Config` when no default can be determined.
    pub fn default_data_source(&self) -> Result<&DataSource> {
        match &self.default {
            Some(name) => self.data_source(name),
            None if self.data_sources.len() == 1 => self
                .data_sources
                .values()
                .next()
                .ok_or_else(|| DbalError::Config(String::from("no data sources configured"))),
            None => Err(DbalError::Config(String::from(
                "no default data source configured",
            ))),
        }
    }
}

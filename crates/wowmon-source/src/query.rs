//! Named statements addressed to one logical database.

use std::fmt;

/// The three AzerothCore schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Database {
    Characters,
    Auth,
    World,
}

impl Database {
    pub const ALL: [Database; 3] = [Database::Characters, Database::Auth, Database::World];

    pub fn as_str(&self) -> &'static str {
        match self {
            Database::Characters => "characters",
            Database::Auth => "auth",
            Database::World => "world",
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

/// A SQL statement with a stable name used for logging and test fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub name: &'static str,
    pub database: Database,
    pub sql: String,
    pub params: Vec<Param>,
}

impl Query {
    pub fn new(name: &'static str, database: Database, sql: impl Into<String>) -> Self {
        Self {
            name,
            database,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a positional `?` parameter.
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }
}

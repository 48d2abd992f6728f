//! Data source error types.

use thiserror::Error;

use crate::query::Database;

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to connect to {database} database: {source}")]
    Connect {
        database: Database,
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid database URL: {0}")]
    Url(#[source] sqlx::Error),

    #[error("query {query} failed: {source}")]
    Query {
        query: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("query {0} returned no rows")]
    NoRows(&'static str),

    #[error("column {column} is out of range for a row of {len}")]
    MissingColumn { column: usize, len: usize },

    #[error("column {0} is NULL")]
    UnexpectedNull(usize),

    #[error("column {column} holds {found}, expected {expected}")]
    Type {
        column: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0}")]
    Backend(String),
}

//! wowmon-source: Read-only access to the game server databases.
//!
//! An AzerothCore realm keeps its data in three schemas: `characters`,
//! `auth` and `world`. Each is reachable through its own pool, and a failure
//! on one never affects the others.
//!
//! Collectors talk to a [`DataSource`], not to sqlx directly, so the
//! collection logic can run against [`MemorySource`] in tests.
//!
//! ```text
//! DataSource (trait)
//!   ├── MySqlSource   : three sqlx pools, used in production
//!   └── MemorySource  : canned rows keyed by query name, used in tests
//! ```

pub mod error;
pub mod memory;
pub mod mysql;
pub mod query;
pub mod row;

use std::future::Future;
use std::pin::Pin;

pub use error::{SourceError, SourceResult};
pub use memory::MemorySource;
pub use mysql::MySqlSource;
pub use query::{Database, Param, Query};
pub use row::{Row, Value};

/// Boxed future returned by [`DataSource`] queries.
pub type QueryFuture<'a, T> = Pin<Box<dyn Future<Output = SourceResult<T>> + Send + 'a>>;

/// A set of independently queryable, read-only databases.
///
/// Implementations must be safe to share between concurrent scrapes.
pub trait DataSource: Send + Sync {
    /// Run `query` against its database and return every row.
    fn fetch_all<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Vec<Row>>;

    /// First row of the result, if any.
    fn fetch_optional<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Option<Row>> {
        let rows = self.fetch_all(query);
        Box::pin(async move { Ok(rows.await?.into_iter().next()) })
    }

    /// First row of the result; an empty result is an error.
    fn fetch_one<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Row> {
        let row = self.fetch_optional(query);
        Box::pin(async move { row.await?.ok_or(SourceError::NoRows(query.name)) })
    }
}

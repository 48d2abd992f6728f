//! In-memory data source for tests.
//!
//! Responses are keyed by query name, optionally narrowed by bound
//! parameters. A query with no configured response fails, so a test only has
//! to describe the groups it cares about.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::SourceError;
use crate::query::{Param, Query};
use crate::row::Row;
use crate::{DataSource, QueryFuture};

#[derive(Debug, Clone)]
enum Response {
    Rows(Vec<Row>),
    Fail(String),
    /// Never completes; used to exercise per-group timeouts.
    Hang,
}

type Key = (&'static str, Option<Vec<Param>>);

#[derive(Debug, Default)]
pub struct MemorySource {
    responses: Mutex<HashMap<Key, Response>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    executed: Mutex<HashMap<&'static str, Query>>,
    delay: Option<Duration>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, name: &'static str, rows: Vec<Row>) -> Self {
        self.set_rows(name, rows);
        self
    }

    /// Rows returned only when the query is bound with exactly `params`.
    pub fn with_rows_for(self, name: &'static str, params: Vec<Param>, rows: Vec<Row>) -> Self {
        lock(&self.responses).insert((name, Some(params)), Response::Rows(rows));
        self
    }

    pub fn with_error(self, name: &'static str, message: impl Into<String>) -> Self {
        self.set_error(name, message);
        self
    }

    pub fn with_hang(self, name: &'static str) -> Self {
        lock(&self.responses).insert((name, None), Response::Hang);
        self
    }

    /// Sleep before answering every query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_rows(&self, name: &'static str, rows: Vec<Row>) {
        lock(&self.responses).insert((name, None), Response::Rows(rows));
    }

    pub fn set_error(&self, name: &'static str, message: impl Into<String>) {
        lock(&self.responses).insert((name, None), Response::Fail(message.into()));
    }

    /// Number of times `name` has been executed.
    pub fn calls(&self, name: &str) -> usize {
        lock(&self.calls).get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// The most recent execution of `name`, with its SQL and bound params.
    pub fn last_query(&self, name: &str) -> Option<Query> {
        lock(&self.executed).get(name).cloned()
    }

    pub fn last_sql(&self, name: &str) -> Option<String> {
        self.last_query(name).map(|query| query.sql)
    }

    fn lookup(&self, query: &Query) -> Option<Response> {
        let responses = lock(&self.responses);
        responses
            .get(&(query.name, Some(query.params.clone())))
            .or_else(|| responses.get(&(query.name, None)))
            .cloned()
    }
}

impl DataSource for MemorySource {
    fn fetch_all<'a>(&'a self, query: &'a Query) -> QueryFuture<'a, Vec<Row>> {
        Box::pin(async move {
            *lock(&self.calls).entry(query.name).or_default() += 1;
            lock(&self.executed).insert(query.name, query.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.lookup(query) {
                Some(Response::Rows(rows)) => Ok(rows),
                Some(Response::Fail(message)) => Err(SourceError::Backend(message)),
                Some(Response::Hang) => std::future::pending().await,
                None => Err(SourceError::Backend(format!(
                    "no response configured for query {}",
                    query.name
                ))),
            }
        })
    }
}

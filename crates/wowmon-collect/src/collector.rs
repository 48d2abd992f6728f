//! The per-group collection seam.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Context as _;
use tracing::debug;
use wowmon_metrics::Batch;
use wowmon_source::{DataSource, Database, Query, Row};

/// Boxed future returned by [`Collector::collect`].
pub type CollectFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// One independent metric group.
///
/// A collector resets the vector metrics it owns, queries the data source
/// and records the results into `out`. Returning an error discards the whole
/// batch.
pub trait Collector: Send + Sync {
    /// Stable group name, used in logs and the `collector` label.
    fn name(&self) -> &'static str;

    fn collect<'a>(&'a self, cx: &'a mut CycleContext, out: &'a mut Batch) -> CollectFuture<'a>;
}

/// State shared by the collectors of one cycle.
///
/// Built fresh for every cycle and dropped at its end, so the account name
/// memo never outlives a scrape.
pub struct CycleContext {
    source: Arc<dyn DataSource>,
    account_names: HashMap<i64, String>,
}

impl CycleContext {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            account_names: HashMap::new(),
        }
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    /// Username of an account, looked up at most once per cycle.
    ///
    /// A failed or empty lookup yields `account_<id>`.
    pub async fn account_name(&mut self, account_id: i64) -> String {
        if let Some(name) = self.account_names.get(&account_id) {
            return name.clone();
        }
        let query = Query::new(
            "account_username",
            Database::Auth,
            "SELECT username FROM account WHERE id = ?",
        )
        .bind(account_id);
        let name = match self.source.fetch_one(&query).await.and_then(|row| row.text(0)) {
            Ok(name) => name,
            Err(e) => {
                debug!(account_id, error = %e, "account lookup failed, using placeholder");
                format!("account_{account_id}")
            }
        };
        self.account_names.insert(account_id, name.clone());
        name
    }
}

/// Every row of `query`.
pub(crate) async fn fetch(source: &dyn DataSource, query: &Query) -> anyhow::Result<Vec<Row>> {
    source
        .fetch_all(query)
        .await
        .with_context(|| format!("running {}", query.name))
}

/// Run `query` and hand each row to `scan`.
pub(crate) async fn each_row<F>(source: &dyn DataSource, query: &Query, mut scan: F) -> anyhow::Result<()>
where
    F: FnMut(&Row) -> wowmon_source::SourceResult<()> + Send,
{
    for row in fetch(source, query).await? {
        scan(&row).with_context(|| format!("scanning {}", query.name))?;
    }
    Ok(())
}

/// First row of `query`, if the result is not empty.
pub(crate) async fn first_row(source: &dyn DataSource, query: &Query) -> anyhow::Result<Option<Row>> {
    source
        .fetch_optional(query)
        .await
        .with_context(|| format!("running {}", query.name))
}

/// Single `COUNT(*)`-style value.
pub(crate) async fn count(source: &dyn DataSource, query: &Query) -> anyhow::Result<f64> {
    let row = source
        .fetch_one(query)
        .await
        .with_context(|| format!("running {}", query.name))?;
    let value = row.int(0).with_context(|| format!("scanning {}", query.name))?;
    Ok(value as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wowmon_source::{MemorySource, Param, row};

    #[tokio::test]
    async fn account_names_are_memoized_per_cycle() {
        let source = Arc::new(
            MemorySource::new()
                .with_rows_for("account_username", vec![Param::Int(5)], vec![row!["thrall"]])
                .with_error("account_username", "no such account"),
        );
        let mut cx = CycleContext::new(source.clone());

        assert_eq!(cx.account_name(5).await, "thrall");
        assert_eq!(cx.account_name(5).await, "thrall");
        assert_eq!(cx.account_name(9).await, "account_9");
        assert_eq!(cx.account_name(9).await, "account_9");
        assert_eq!(source.calls("account_username"), 2);

        let mut next = CycleContext::new(source.clone());
        assert_eq!(next.account_name(5).await, "thrall");
        assert_eq!(source.calls("account_username"), 3);
    }

    #[tokio::test]
    async fn missing_account_row_falls_back() {
        let source = Arc::new(MemorySource::new().with_rows("account_username", vec![]));
        let mut cx = CycleContext::new(source);
        assert_eq!(cx.account_name(12).await, "account_12");
    }

    #[tokio::test]
    async fn count_reads_first_column() {
        let source = MemorySource::new().with_rows("guild_count", vec![row![4]]);
        let query = Query::new("guild_count", Database::Characters, "SELECT COUNT(*) FROM guild");
        assert_eq!(count(&source, &query).await.unwrap(), 4.0);
    }

    #[tokio::test]
    async fn scan_errors_name_the_query() {
        let source = MemorySource::new().with_rows("broken", vec![row![None::<i64>]]);
        let query = Query::new("broken", Database::Characters, "SELECT NULL");
        let err = each_row(&source, &query, |row| row.int(0).map(drop))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("scanning broken"));
    }
}

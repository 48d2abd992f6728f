//! Scrape cycle orchestration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wowmon_metrics::definitions::{COLLECTOR_DURATION, COLLECTOR_SUCCESS};
use wowmon_metrics::{Batch, Registry, Snapshot, Staging};
use wowmon_source::DataSource;

use crate::collector::{Collector, CycleContext};

/// Runs every collector against the data source and publishes the results.
///
/// Safe to call concurrently: each cycle stages its own updates and publishes
/// only the groups it collected, so a slow cycle whose group failed never
/// rolls back what a newer cycle already published.
pub struct Exporter {
    registry: Arc<Registry>,
    source: Arc<dyn DataSource>,
    collectors: Vec<Box<dyn Collector>>,
    group_timeout: Duration,
}

impl Exporter {
    pub fn new(
        registry: Arc<Registry>,
        source: Arc<dyn DataSource>,
        collectors: Vec<Box<dyn Collector>>,
        group_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            collectors,
            group_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn collector_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.collectors.iter().map(|c| c.name())
    }

    /// Run one full collection cycle and return the published snapshot.
    ///
    /// Never fails: a group that errors or exceeds the timeout keeps its
    /// previous values and is reported through `wow_exporter_collector_success`.
    pub async fn collect(&self) -> Snapshot {
        let started = Instant::now();
        let mut staging = self.registry.stage();
        let mut cx = CycleContext::new(Arc::clone(&self.source));
        let mut failed = 0usize;

        for collector in &self.collectors {
            let name = collector.name();
            let group_started = Instant::now();
            let mut batch = Batch::new();

            let outcome =
                tokio::time::timeout(self.group_timeout, collector.collect(&mut cx, &mut batch)).await;
            let ok = match outcome {
                Ok(Ok(())) => match staging.apply(batch) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(collector = name, error = %e, "collector produced invalid updates");
                        false
                    }
                },
                Ok(Err(e)) => {
                    warn!(collector = name, error = format!("{e:#}"), "collector failed");
                    false
                }
                Err(_) => {
                    warn!(
                        collector = name,
                        timeout_secs = self.group_timeout.as_secs_f64(),
                        "collector timed out"
                    );
                    false
                }
            };
            if !ok {
                failed += 1;
            }
            record_outcome(&mut staging, name, ok, group_started.elapsed());
        }

        let snapshot = self.registry.publish(staging);
        debug!(
            succeeded = self.collectors.len() - failed,
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle complete"
        );
        snapshot
    }
}

fn record_outcome(staging: &mut Staging<'_>, name: &'static str, ok: bool, elapsed: Duration) {
    let success = if ok { 1.0 } else { 0.0 };
    for (desc, value) in [
        (&COLLECTOR_SUCCESS, success),
        (&COLLECTOR_DURATION, elapsed.as_secs_f64()),
    ] {
        if let Err(e) = staging.set(desc, &[name], value) {
            debug!(collector = name, metric = desc.name, error = %e, "self-metric not recorded");
        }
    }
}

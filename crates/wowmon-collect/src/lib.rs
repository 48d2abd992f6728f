//! wowmon-collect: Turns database rows into gauge values.
//!
//! Each metric group (players, mail, accounts, ...) is a [`Collector`]. The
//! [`Exporter`] runs every collector once per scrape against a private
//! staging copy of the registry and publishes the result atomically.
//!
//! # Architecture
//!
//! ```text
//! Exporter::collect()
//!   ├── registry.stage()                     → Staging
//!   ├── for each Collector (sequential):
//!   │     timeout(collector.collect(cx, batch))
//!   │       ├── Ok        → staging.apply(batch)
//!   │       └── Err/late  → batch dropped, warn!
//!   │     staging.set(collector_success / duration)
//!   └── registry.publish(staging)            → Snapshot
//! ```
//!
//! A failing group never affects the others: its batch is discarded and the
//! staged values it would have replaced keep their previous state.

pub mod collector;
pub mod collectors;
pub mod exporter;
pub mod filter;

pub use collector::{CollectFuture, Collector, CycleContext};
pub use collectors::default_collectors;
pub use exporter::Exporter;
pub use filter::real_population;

//! wowmon-metrics: The gauge registry behind the exporter.
//!
//! A [`Registry`] holds a fixed set of metric definitions and their current
//! values. Collection never mutates the live values in place: a scrape
//! cycle takes a [`Staging`] copy, applies one [`Batch`] per metric group,
//! and publishes the result atomically.
//!
//! # Architecture
//!
//! ```text
//! Registry
//!   ├── register()  ← startup, fixed afterwards
//!   ├── stage()     → Staging (private copy for one cycle)
//!   │     └── apply(Batch)  ← one batch per metric group, all-or-nothing
//!   ├── publish(Staging) → Snapshot (atomic swap)
//!   └── snapshot()  → Snapshot
//!
//! Prometheus exposition
//!   └── render_prometheus(&Snapshot) → text/plain for /metrics
//! ```

pub mod definitions;
pub mod error;
pub mod prometheus;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use prometheus::{CONTENT_TYPE, render_prometheus};
pub use registry::{Batch, MetricDesc, MetricKind, Registry, Sample, Snapshot, Staging};

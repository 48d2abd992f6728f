//! Gauge registry with staged, atomically published updates.
//!
//! The live values sit behind an `RwLock<Arc<_>>`. Readers clone the `Arc`
//! and never observe a half-written cycle. A cycle stages its accepted
//! batches in a journal and publishing replays that journal onto the live
//! values under the write lock, so overlapping cycles only ever replace the
//! groups they actually collected.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Shape of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A single unlabeled value.
    Gauge,
    /// A family of values keyed by the given label names.
    GaugeVec(&'static [&'static str]),
}

/// Static definition of one exported metric.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

impl MetricDesc {
    pub const fn gauge(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
        }
    }

    pub const fn gauge_vec(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::GaugeVec(labels),
        }
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        match self.kind {
            MetricKind::Gauge => &[],
            MetricKind::GaugeVec(labels) => labels,
        }
    }

    pub fn is_vec(&self) -> bool {
        matches!(self.kind, MetricKind::GaugeVec(_))
    }
}

type Series = BTreeMap<Vec<String>, f64>;

#[derive(Debug, Clone, Default, PartialEq)]
struct Values(BTreeMap<&'static str, Series>);

impl Values {
    fn apply(&mut self, op: &Op) {
        match op {
            Op::Reset(desc) => {
                if desc.is_vec() {
                    self.0.entry(desc.name).or_default().clear();
                }
            }
            Op::Set(desc, labels, value) => {
                self.0
                    .entry(desc.name)
                    .or_default()
                    .insert(labels.clone(), *value);
            }
            Op::Add(desc, labels, delta) => {
                *self
                    .0
                    .entry(desc.name)
                    .or_default()
                    .entry(labels.clone())
                    .or_insert(0.0) += delta;
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Op {
    Reset(&'static MetricDesc),
    Set(&'static MetricDesc, Vec<String>, f64),
    Add(&'static MetricDesc, Vec<String>, f64),
}

impl Op {
    fn desc(&self) -> &'static MetricDesc {
        match self {
            Op::Reset(desc) | Op::Set(desc, ..) | Op::Add(desc, ..) => desc,
        }
    }

    fn labels(&self) -> Option<&[String]> {
        match self {
            Op::Reset(_) => None,
            Op::Set(_, labels, _) | Op::Add(_, labels, _) => Some(labels),
        }
    }
}

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

/// Updates produced by one metric group, applied all-or-nothing.
///
/// Operations replay in order, so a `reset` followed by `add`s seeds every
/// accumulated series from zero.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<Op>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every series of a vector metric. No-op for scalar gauges.
    pub fn reset(&mut self, desc: &'static MetricDesc) {
        self.ops.push(Op::Reset(desc));
    }

    /// Replace the value of one series, creating it if absent.
    pub fn set(&mut self, desc: &'static MetricDesc, labels: &[&str], value: f64) {
        self.ops.push(Op::Set(desc, owned(labels), value));
    }

    /// Accumulate into one series, starting from zero if absent.
    pub fn add(&mut self, desc: &'static MetricDesc, labels: &[&str], delta: f64) {
        self.ops.push(Op::Add(desc, owned(labels), delta));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Holds every metric definition and its published values.
///
/// Definitions are registered through `&mut self` before the registry is
/// shared; once behind an `Arc` the set of metrics is fixed.
#[derive(Debug, Default)]
pub struct Registry {
    descs: BTreeMap<&'static str, &'static MetricDesc>,
    current: RwLock<Arc<Values>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding `descs`.
    pub fn with_metrics(descs: &[&'static MetricDesc]) -> RegistryResult<Self> {
        let mut registry = Self::new();
        for desc in descs {
            registry.register(desc)?;
        }
        Ok(registry)
    }

    /// Register a definition. Registering the same definition twice is a
    /// no-op; reusing a name with a different shape is an error.
    ///
    /// Scalar gauges start at zero.
    pub fn register(&mut self, desc: &'static MetricDesc) -> RegistryResult<()> {
        if let Some(existing) = self.descs.get(desc.name) {
            return if existing.kind == desc.kind {
                Ok(())
            } else {
                Err(RegistryError::Conflict(desc.name))
            };
        }

        self.descs.insert(desc.name, desc);
        let values = Arc::make_mut(
            self.current
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let series = values.0.entry(desc.name).or_default();
        if !desc.is_vec() {
            series.insert(Vec::new(), 0.0);
        }
        debug!(metric = desc.name, labels = desc.label_names().len(), "registered metric");
        Ok(())
    }

    /// Registered definitions, sorted by name.
    pub fn describe(&self) -> impl Iterator<Item = &'static MetricDesc> + '_ {
        self.descs.values().copied()
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn reset(&self, desc: &'static MetricDesc) -> RegistryResult<()> {
        self.mutate(Op::Reset(desc))
    }

    pub fn set(&self, desc: &'static MetricDesc, labels: &[&str], value: f64) -> RegistryResult<()> {
        self.mutate(Op::Set(desc, owned(labels), value))
    }

    pub fn add(&self, desc: &'static MetricDesc, labels: &[&str], delta: f64) -> RegistryResult<()> {
        self.mutate(Op::Add(desc, owned(labels), delta))
    }

    /// Start a collection cycle from a private copy of the current values.
    pub fn stage(&self) -> Staging<'_> {
        let values = Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner));
        Staging {
            registry: self,
            values,
            journal: Vec::new(),
        }
    }

    /// Atomically apply every update a cycle staged to the live values and
    /// return the snapshot that was published.
    ///
    /// Metrics the cycle never touched keep whatever is live at publish
    /// time, including values published by an overlapping newer cycle.
    pub fn publish(&self, staging: Staging<'_>) -> Snapshot {
        debug_assert!(std::ptr::eq(staging.registry, self));
        let values = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let live = Arc::make_mut(&mut current);
            for op in &staging.journal {
                live.apply(op);
            }
            Arc::clone(&current)
        };
        debug!(updates = staging.journal.len(), "published cycle");
        self.snapshot_of(values)
    }

    pub fn snapshot(&self) -> Snapshot {
        let values = Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner));
        self.snapshot_of(values)
    }

    fn snapshot_of(&self, values: Arc<Values>) -> Snapshot {
        Snapshot {
            descs: self.descs.values().copied().collect(),
            values,
        }
    }

    fn mutate(&self, op: Op) -> RegistryResult<()> {
        self.validate(&op)?;
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut current).apply(&op);
        Ok(())
    }

    fn validate(&self, op: &Op) -> RegistryResult<()> {
        let desc = op.desc();
        match self.descs.get(desc.name) {
            None => return Err(RegistryError::Unknown(desc.name)),
            Some(registered) if registered.kind != desc.kind => {
                return Err(RegistryError::Conflict(desc.name));
            }
            Some(_) => {}
        }
        if let Some(labels) = op.labels() {
            let expected = desc.label_names().len();
            if labels.len() != expected {
                return Err(RegistryError::LabelArity {
                    name: desc.name,
                    expected,
                    actual: labels.len(),
                });
            }
        }
        Ok(())
    }
}

/// The updates accepted during one cycle, with a private preview of their
/// effect.
///
/// Nothing written here is visible to readers until
/// [`Registry::publish`].
#[derive(Debug)]
pub struct Staging<'r> {
    registry: &'r Registry,
    values: Arc<Values>,
    journal: Vec<Op>,
}

impl Staging<'_> {
    /// Apply every operation of `batch`, or none of them if any is invalid.
    pub fn apply(&mut self, batch: Batch) -> RegistryResult<()> {
        for op in &batch.ops {
            self.registry.validate(op)?;
        }
        let values = Arc::make_mut(&mut self.values);
        for op in &batch.ops {
            values.apply(op);
        }
        self.journal.extend(batch.ops);
        Ok(())
    }

    pub fn set(&mut self, desc: &'static MetricDesc, labels: &[&str], value: f64) -> RegistryResult<()> {
        let op = Op::Set(desc, owned(labels), value);
        self.registry.validate(&op)?;
        Arc::make_mut(&mut self.values).apply(&op);
        self.journal.push(op);
        Ok(())
    }

    /// View of the staged values.
    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot_of(Arc::clone(&self.values))
    }
}

/// One exported series.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    pub name: &'static str,
    /// `(label name, label value)` pairs in definition order.
    pub labels: Vec<(&'static str, &'a str)>,
    pub value: f64,
}

/// Immutable view of the registry at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    descs: Vec<&'static MetricDesc>,
    values: Arc<Values>,
}

impl Snapshot {
    /// Definitions, sorted by name.
    pub fn descriptors(&self) -> &[&'static MetricDesc] {
        &self.descs
    }

    /// Series of one metric, sorted by label values.
    pub fn series(&self, name: &str) -> Vec<(&[String], f64)> {
        self.values
            .0
            .get(name)
            .map(|series| series.iter().map(|(k, v)| (k.as_slice(), *v)).collect())
            .unwrap_or_default()
    }

    /// Value of one series, if published.
    pub fn get(&self, name: &str, labels: &[&str]) -> Option<f64> {
        let key = owned(labels);
        self.values.0.get(name)?.get(&key).copied()
    }

    /// Every series of every metric, sorted by name then label values.
    pub fn samples(&self) -> Vec<Sample<'_>> {
        let mut out = Vec::new();
        for desc in &self.descs {
            let Some(series) = self.values.0.get(desc.name) else {
                continue;
            };
            for (labels, value) in series {
                out.push(Sample {
                    name: desc.name,
                    labels: desc
                        .label_names()
                        .iter()
                        .copied()
                        .zip(labels.iter().map(String::as_str))
                        .collect(),
                    value: *value,
                });
            }
        }
        out
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.descs == other.descs && self.values == other.values
    }
}

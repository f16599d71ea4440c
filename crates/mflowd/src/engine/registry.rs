//! Aggregation registry: base name -> aggregator -> series.
//!
//! Storage is `DashMap` at both levels with atomic cells per series, so the
//! exposition sink can read a snapshot while the engine writes other keys.
//! Only the engine mutates (the write API is crate-private).

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use dashmap::DashMap;
use mflow_core::{LabelSet, MetricKind};

/// Resolved aggregation semantics of an established metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Counter,
    Gauge,
}

impl SeriesKind {
    /// `None` for unsupported kinds.
    pub fn from_metric_kind(kind: &MetricKind) -> Option<Self> {
        match kind {
            MetricKind::Counter => Some(SeriesKind::Counter),
            MetricKind::Gauge => Some(SeriesKind::Gauge),
            MetricKind::Other(_) => None,
        }
    }

    pub fn as_metric_kind(self) -> MetricKind {
        match self {
            SeriesKind::Counter => MetricKind::Counter,
            SeriesKind::Gauge => MetricKind::Gauge,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesKind::Counter => "counter",
            SeriesKind::Gauge => "gauge",
        }
    }
}

/// One series value. f64 is stored as raw bits.
///
/// Single writer (the engine), any number of readers. Only gauge cells carry
/// the time of their current value; counters are order-free.
#[derive(Debug)]
pub(crate) struct SeriesCell {
    bits: AtomicU64,
    gauge_ts: Option<AtomicI64>,
}

impl SeriesCell {
    pub(crate) fn counter() -> Self {
        Self {
            bits: AtomicU64::new(0f64.to_bits()),
            gauge_ts: None,
        }
    }

    pub(crate) fn gauge(value: f64, timestamp: i64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
            gauge_ts: Some(AtomicI64::new(timestamp)),
        }
    }

    pub(crate) fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Timestamp of the current gauge value; `None` for counters.
    pub(crate) fn timestamp(&self) -> Option<i64> {
        self.gauge_ts.as_ref().map(|t| t.load(Ordering::Acquire))
    }

    pub(crate) fn add(&self, delta: f64) {
        let next = self.value() + delta;
        self.bits.store(next.to_bits(), Ordering::Release);
    }

    pub(crate) fn set(&self, value: f64, timestamp: i64) {
        if let Some(ts) = &self.gauge_ts {
            ts.store(timestamp, Ordering::Release);
        }
        self.bits.store(value.to_bits(), Ordering::Release);
    }
}

/// Per-name aggregator. Kind and label schema are fixed at creation.
#[derive(Debug)]
pub struct Aggregator {
    kind: SeriesKind,
    label_names: Vec<String>,
    /// Keyed by label values, in `label_names` order.
    series: DashMap<Vec<String>, SeriesCell>,
}

impl Aggregator {
    pub(crate) fn new(kind: SeriesKind, label_names: Vec<String>) -> Self {
        Self {
            kind,
            label_names,
            series: DashMap::new(),
        }
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    pub(crate) fn series(&self) -> &DashMap<Vec<String>, SeriesCell> {
        &self.series
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn matches_schema(&self, labels: &LabelSet) -> bool {
        labels.len() == self.label_names.len()
            && labels
                .names()
                .zip(self.label_names.iter())
                .all(|(a, b)| a == b)
    }

    /// Current value of the series selected by `labels`.
    pub fn value(&self, labels: &LabelSet) -> Option<f64> {
        if !self.matches_schema(labels) {
            return None;
        }
        let key: Vec<String> = labels.values().map(str::to_owned).collect();
        self.series.get(&key).map(|c| c.value().value())
    }

    /// All series as (labels, value), sorted by label values.
    pub fn collect(&self) -> Vec<(LabelSet, f64)> {
        let mut rows: Vec<(Vec<String>, f64)> = self
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().value()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        rows.into_iter()
            .map(|(values, v)| {
                let labels = LabelSet::from_pairs(self.label_names.iter().cloned().zip(values));
                (labels, v)
            })
            .collect()
    }
}

/// Aggregation registry. Explicit instance, never process-global.
#[derive(Debug, Default)]
pub struct Registry {
    metrics: DashMap<String, Aggregator>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn metrics(&self) -> &DashMap<String, Aggregator> {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Known metric names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.metrics.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    pub fn kind(&self, name: &str) -> Option<SeriesKind> {
        self.metrics.get(name).map(|a| a.kind())
    }

    pub fn value(&self, name: &str, labels: &LabelSet) -> Option<f64> {
        self.metrics.get(name).and_then(|a| a.value().value(labels))
    }

    pub fn series_count(&self, name: &str) -> usize {
        self.metrics.get(name).map(|a| a.series_count()).unwrap_or(0)
    }

    /// Run `f` against one aggregator without cloning it.
    pub fn with_aggregator<R>(&self, name: &str, f: impl FnOnce(&Aggregator) -> R) -> Option<R> {
        self.metrics.get(name).map(|a| f(a.value()))
    }
}

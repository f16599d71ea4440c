//! Daemon self-metrics.
//!
//! Counters with dynamic labels backed by `DashMap`. Labels are flattened
//! into sorted key vectors to keep deterministic ordering.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use super::label_str;

/// Namespace of the daemon's own metrics. Aggregated names may not use it.
pub const SELF_METRIC_PREFIX: &str = "mflow_";

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let key = Self::key(labels);
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value (0 if never incremented).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&Self::key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut key: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        key.sort();
        key
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        let mut rows: Vec<(Vec<(String, String)>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        rows.sort();

        for (key, val) in rows {
            let labels = label_str(key.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            if labels.is_empty() {
                let _ = writeln!(out, "{} {}", name, val);
            } else {
                let _ = writeln!(out, "{}{{{}}} {}", name, labels, val);
            }
        }
    }
}

#[derive(Default)]
pub struct DaemonMetrics {
    /// Samples seen by the engine, by outcome (`applied`, `stale`, or an error code).
    pub samples: CounterVec,
    /// Records dropped before reaching the engine, by source and error code.
    pub decode_failures: CounterVec,
    pub scrapes: CounterVec,
}

impl DaemonMetrics {
    /// Append all daemon metrics to `out`.
    pub fn render(&self, out: &mut String) {
        self.samples.render("mflow_samples_total", out);
        self.decode_failures.render("mflow_decode_failures_total", out);
        self.scrapes.render("mflow_scrapes_total", out);
    }
}

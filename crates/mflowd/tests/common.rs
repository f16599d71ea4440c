//! Sample builders shared by engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use mflow_core::{LabelSet, MetricKind, MetricSample};

pub const T: i64 = 1_700_000_000;

pub fn counter(name: &str, value: f64) -> MetricSample {
    MetricSample::new(name, MetricKind::Counter, LabelSet::new(), value, T)
}

pub fn gauge(name: &str, value: f64, ts: i64) -> MetricSample {
    MetricSample::new(name, MetricKind::Gauge, LabelSet::new(), value, ts)
}

pub fn labeled(name: &str, kind: MetricKind, labels: &[(&str, &str)], value: f64) -> MetricSample {
    MetricSample::new(name, kind, LabelSet::from_pairs(labels.iter().copied()), value, T)
}

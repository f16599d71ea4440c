//! Accumulation rules.
//!
//! `Engine` is the only writer of its `Registry`. It is driven one sample at
//! a time by the actor loop; tests drive it directly.

use std::sync::Arc;

use mflow_core::error::{MflowError, Result};
use mflow_core::MetricSample;

use crate::obs::metrics::SELF_METRIC_PREFIX;

use super::registry::{Aggregator, Registry, SeriesCell, SeriesKind};
use super::scrape::SnapshotHandle;

/// Result of a sample that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// State changed.
    Applied,
    /// Gauge sample older than the stored one; state unchanged.
    Stale,
}

impl ApplyOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplyOutcome::Applied => "applied",
            ApplyOutcome::Stale => "stale",
        }
    }
}

#[derive(Debug, Default)]
pub struct Engine {
    registry: Arc<Registry>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine over a caller-provided registry (isolated per test run).
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Live view of the registry for the exposition sink.
    pub fn snapshot(&self) -> SnapshotHandle {
        SnapshotHandle::new(Arc::clone(&self.registry))
    }

    /// Apply one sample. On error nothing is created or changed.
    pub fn apply(&mut self, sample: &MetricSample) -> Result<ApplyOutcome> {
        if sample.base_name().starts_with(SELF_METRIC_PREFIX) {
            return Err(MflowError::ReservedName(sample.base_name().to_string()));
        }

        let metrics = self.registry.metrics();

        if let Some(agg) = metrics.get(sample.base_name()) {
            check(&agg, sample)?;
            return Ok(accumulate(&agg, sample));
        }

        let kind = SeriesKind::from_metric_kind(sample.kind()).ok_or_else(|| {
            MflowError::UnknownKind {
                name: sample.base_name().to_string(),
                kind: sample.kind().to_string(),
            }
        })?;

        let names = sample.labels().names().map(str::to_owned).collect();
        let agg = Aggregator::new(kind, names);
        check(&agg, sample)?;
        let outcome = accumulate(&agg, sample);

        // Published only once it holds its first series.
        metrics.insert(sample.base_name().to_string(), agg);
        tracing::debug!(name = %sample.base_name(), kind = kind.as_str(), "new aggregation");
        Ok(outcome)
    }
}

fn check(agg: &Aggregator, sample: &MetricSample) -> Result<()> {
    if SeriesKind::from_metric_kind(sample.kind()) != Some(agg.kind()) {
        return Err(MflowError::TypeConflict {
            name: sample.base_name().to_string(),
            established: agg.kind().as_metric_kind(),
            got: sample.kind().clone(),
        });
    }

    if !agg.matches_schema(sample.labels()) {
        return Err(MflowError::LabelSchemaMismatch {
            name: sample.base_name().to_string(),
            expected: agg.label_names().to_vec(),
            got: sample.labels().names().map(str::to_owned).collect(),
        });
    }

    let v = sample.value();
    if agg.kind() == SeriesKind::Counter && (!v.is_finite() || v < 0.0) {
        return Err(MflowError::InvalidValue {
            name: sample.base_name().to_string(),
            value: v,
        });
    }

    Ok(())
}

fn accumulate(agg: &Aggregator, sample: &MetricSample) -> ApplyOutcome {
    let key: Vec<String> = sample.labels().values().map(str::to_owned).collect();
    let series = agg.series();

    match agg.kind() {
        SeriesKind::Counter => {
            tracing::debug!(name = %sample.base_name(), labels = ?sample.labels().pairs(), value = sample.value(), "[COUNTER AGGR]");
            series
                .entry(key)
                .or_insert_with(SeriesCell::counter)
                .add(sample.value());
            ApplyOutcome::Applied
        }
        SeriesKind::Gauge => {
            if let Some(cell) = series.get(&key) {
                if cell.timestamp().is_some_and(|ts| sample.timestamp() < ts) {
                    return ApplyOutcome::Stale;
                }
                cell.set(sample.value(), sample.timestamp());
            } else {
                series.insert(key, SeriesCell::gauge(sample.value(), sample.timestamp()));
            }
            tracing::debug!(name = %sample.base_name(), labels = ?sample.labels().pairs(), value = sample.value(), "[GAUGE AGGR]");
            ApplyOutcome::Applied
        }
    }
}

//! Canonical metric sample handed to the aggregation engine.

use std::collections::BTreeMap;
use std::fmt;

/// Aggregation kind selected by a metric name's suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Running sum per label-value key.
    Counter,
    /// Timestamp-ordered last write per label-value key.
    Gauge,
    /// Unsupported suffix, kept verbatim so the engine can reject it.
    Other(String),
}

impl MetricKind {
    /// Resolve a name suffix. `sum`/`mean` are accepted as aliases.
    pub fn from_suffix(suffix: &str) -> Self {
        match suffix {
            "counter" | "sum" => MetricKind::Counter,
            "gauge" | "mean" => MetricKind::Gauge,
            other => MetricKind::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MetricKind::Other(_))
    }

    /// Exposition type name (`counter`/`gauge`), or the raw suffix.
    pub fn as_str(&self) -> &str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Other(s) => s,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label set with unique names in canonical (sorted) order.
///
/// Two label sets built from the same pairs in any order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary pairs. Duplicate names keep the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let dedup: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            pairs: dedup.into_iter().collect(),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(_, v)| v.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(k, _)| k.as_str().cmp(name))
            .ok()
            .map(|i| self.pairs[i].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// One normalized metric update. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    base_name: String,
    kind: MetricKind,
    labels: LabelSet,
    value: f64,
    timestamp: i64,
}

impl MetricSample {
    pub fn new(
        base_name: impl Into<String>,
        kind: MetricKind,
        labels: LabelSet,
        value: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            kind,
            labels,
            value,
            timestamp,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }
    pub fn kind(&self) -> &MetricKind {
        &self.kind
    }
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }
    pub fn value(&self) -> f64 {
        self.value
    }
    /// Event time in unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

//! Prometheus text exposition.
//!
//! - `exposition`: renders an aggregation snapshot (the scraped data)
//! - `metrics`: the daemon's own counters, rendered after it

pub mod exposition;
pub mod metrics;

/// Helper to escape label values.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// `k1="v1",k2="v2"` for a sorted label list.
pub(crate) fn label_str<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

//! Exposition sink: snapshot -> Prometheus text format 0.0.4.
//!
//! Metrics are rendered in name order, series in label-value order, so two
//! scrapes of the same state produce identical bodies.

use std::fmt::Write;

use crate::engine::SnapshotHandle;

use super::label_str;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every known series as `<name>{<label>="<value>",...} <number>`.
pub fn render(snapshot: &SnapshotHandle, out: &mut String) {
    let registry = snapshot.registry();

    for name in registry.names() {
        registry.with_aggregator(&name, |agg| {
            let _ = writeln!(out, "# TYPE {} {}", name, agg.kind().as_str());
            for (labels, value) in agg.collect() {
                let value = format_value(value);
                if labels.is_empty() {
                    let _ = writeln!(out, "{} {}", name, value);
                } else {
                    let pairs = label_str(labels.pairs().iter().map(|(k, v)| (k.as_str(), v.as_str())));
                    let _ = writeln!(out, "{}{{{}}} {}", name, pairs, value);
                }
            }
        });
    }
}

/// Convenience wrapper returning a fresh body.
pub fn render_to_string(snapshot: &SnapshotHandle) -> String {
    let mut out = String::new();
    render(snapshot, &mut out);
    out
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v.is_infinite() {
        if v > 0.0 { "+Inf".into() } else { "-Inf".into() }
    } else {
        v.to_string()
    }
}

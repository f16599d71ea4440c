#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use mflow_core::{LabelSet, MetricKind};

#[test]
fn permuted_pairs_are_equal() {
    let a = LabelSet::from_pairs([("one", "1"), ("two", "2"), ("three", "3")]);
    let b = LabelSet::from_pairs([("three", "3"), ("one", "1"), ("two", "2")]);
    assert_eq!(a, b);
    assert_eq!(a.names().collect::<Vec<_>>(), vec!["one", "three", "two"]);
    assert_eq!(a.values().collect::<Vec<_>>(), vec!["1", "3", "2"]);
}

#[test]
fn duplicate_names_keep_last_value() {
    let l = LabelSet::from_pairs([("host", "a"), ("zone", "eu"), ("host", "b")]);
    assert_eq!(l.len(), 2);
    assert_eq!(l.get("host"), Some("b"));
    assert_eq!(l.get("zone"), Some("eu"));
    assert_eq!(l.get("missing"), None);
}

#[test]
fn kind_suffixes() {
    assert_eq!(MetricKind::from_suffix("counter"), MetricKind::Counter);
    assert_eq!(MetricKind::from_suffix("sum"), MetricKind::Counter);
    assert_eq!(MetricKind::from_suffix("gauge"), MetricKind::Gauge);
    assert_eq!(MetricKind::from_suffix("mean"), MetricKind::Gauge);

    let other = MetricKind::from_suffix("type");
    assert!(!other.is_known());
    assert_eq!(other.to_string(), "type");
}

//! Normalizer vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use mflow_core::normalize::{decode, is_valid_label_name, is_valid_metric_name, split_name};

mod vector_loader;
use vector_loader::load;

const TS: i64 = 1_700_000_000;

#[test]
fn event_vectors() {
    let files = [
        "event_counter_labels.json",
        "event_gauge_no_labels.json",
        "event_many_separators.json",
        "event_duplicate_labels.json",
        "event_no_kind.json",
        "event_empty_kind.json",
        "event_bad_json.json",
        "event_missing_value.json",
        "event_invalid_base_name.json",
        "event_base_name_brace.json",
        "event_invalid_label_name.json",
        "event_reserved_label_name.json",
        "event_colon_name.json",
    ];

    for f in files {
        let v = load(f);
        let res = decode(v.payload.as_bytes(), TS);

        if let Some(err) = v.expect_error {
            let e = res.expect_err("expected error");
            assert_eq!(e.code().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let sample = res.expect("expected ok sample");
        let ex = v.expect.expect("missing expect block");

        assert_eq!(sample.base_name(), ex.base_name, "vector={}", v.description);
        assert_eq!(sample.kind().as_str(), ex.kind, "vector={}", v.description);
        assert_eq!(sample.value(), ex.value, "vector={}", v.description);
        assert_eq!(sample.timestamp(), TS, "vector={}", v.description);
        assert_eq!(sample.labels().pairs(), ex.labels.as_slice(), "vector={}", v.description);
    }
}

#[test]
fn split_uses_last_separator() {
    assert_eq!(
        split_name("event_with_many_dashes_in_name_and_type").unwrap(),
        ("event_with_many_dashes_in_name_and", "type")
    );
    assert_eq!(split_name("requests_sum").unwrap(), ("requests", "sum"));
    assert!(split_name("eventWithNoType").is_err());
    assert!(split_name("_counter").is_err());
}

#[test]
fn exposition_name_rules() {
    for ok in ["a", "_x", "job:rate", "http_requests", "A9"] {
        assert!(is_valid_metric_name(ok), "name={ok:?}");
    }
    for bad in ["", "9a", "a b", "a-b", "a{b", "a\nb", "caf\u{e9}"] {
        assert!(!is_valid_metric_name(bad), "name={bad:?}");
    }

    for ok in ["a", "_x", "code", "l1"] {
        assert!(is_valid_label_name(ok), "label={ok:?}");
    }
    for bad in ["", "__name__", "__", "a:b", "a\"b", "1a", "a=b"] {
        assert!(!is_valid_label_name(bad), "label={bad:?}");
    }
}

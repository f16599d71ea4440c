#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use mflow_core::normalize::is_valid_metric_name;
use mflow_core::{decode, ErrorCode, MetricKind};
use mflowd::app_state::AppState;
use mflowd::engine;
use mflowd::obs::metrics::DaemonMetrics;
use mflowd::router::build_router;

mod common;
use common::{counter, labeled};

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let ctype = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, ctype, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn status_is_fixed() {
    let (_handle, scrape, _task) = engine::spawn(CancellationToken::new(), Arc::default());
    let app = build_router(AppState::new(scrape, Arc::default()));

    let (status, _, body) = get(app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok\n");
}

#[tokio::test]
async fn metrics_renders_aggregated_snapshot() {
    let cancel = CancellationToken::new();
    let metrics = Arc::new(DaemonMetrics::default());
    let (handle, scrape, _task) = engine::spawn(cancel.clone(), Arc::clone(&metrics));

    handle.apply(counter("sum_metric", 1.0)).await.unwrap();
    handle.apply(counter("sum_metric", 2.0)).await.unwrap();
    handle
        .apply(labeled("latency", MetricKind::Gauge, &[("path", "/a"), ("method", "GET")], 0.25))
        .await
        .unwrap();

    let app = build_router(AppState::new(scrape, Arc::clone(&metrics)));
    let (status, ctype, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctype.as_deref(), Some("text/plain; version=0.0.4; charset=utf-8"));
    assert!(body.contains("# TYPE sum_metric counter\nsum_metric 3\n"), "body={body}");
    assert!(
        body.contains("# TYPE latency gauge\nlatency{method=\"GET\",path=\"/a\"} 0.25\n"),
        "body={body}"
    );
    assert!(body.contains("mflow_samples_total{outcome=\"applied\"} 3\n"), "body={body}");
    assert!(body.contains("mflow_scrapes_total 1\n"), "body={body}");

    cancel.cancel();
}

/// Every sample line is `name[{labels}] value` with exposition-safe names,
/// and each metric family is declared once.
fn assert_well_formed(body: &str) {
    let mut families = Vec::new();
    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("# TYPE ") {
            let (name, kind) = rest.split_once(' ').unwrap();
            assert!(is_valid_metric_name(name), "line={line:?}");
            assert!(kind == "counter" || kind == "gauge", "line={line:?}");
            assert!(!families.contains(&name), "duplicate TYPE for {name}");
            families.push(name);
            continue;
        }
        let name_end = line.find(['{', ' ']).unwrap();
        assert!(is_valid_metric_name(&line[..name_end]), "line={line:?}");
        let value = line.rsplit_once(' ').unwrap().1;
        assert!(value.parse::<f64>().is_ok() || value.ends_with("Inf"), "line={line:?}");
    }
}

#[tokio::test]
async fn hostile_names_never_reach_the_scrape() {
    let cancel = CancellationToken::new();
    let metrics = Arc::new(DaemonMetrics::default());
    let (handle, scrape, _task) = engine::spawn(cancel.clone(), Arc::clone(&metrics));

    let bad_name = br#"{"name":"evil 9\nfake_metric_counter","value":1}"#;
    let bad_label = br#"{"name":"ok_counter","value":1,"labelNameValuePairs":[{"name":"a\"b","value":"x"}]}"#;
    assert_eq!(decode(bad_name, 0).unwrap_err().code(), ErrorCode::MalformedName);
    assert_eq!(decode(bad_label, 0).unwrap_err().code(), ErrorCode::InvalidLabelName);

    let shadow = decode(br#"{"name":"mflow_scrapes_total_counter","value":5}"#, 0).unwrap();
    assert_eq!(handle.apply(shadow).await.unwrap_err().code(), ErrorCode::ReservedName);

    let good = decode(br#"{"name":"ok_counter","value":2,"labelNameValuePairs":[{"name":"code","value":"a\"b"}]}"#, 0).unwrap();
    handle.apply(good).await.unwrap();

    let app = build_router(AppState::new(scrape, Arc::clone(&metrics)));
    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok{code=\"a\\\"b\"} 2\n"), "body={body}");
    assert!(body.contains("mflow_samples_total{outcome=\"reserved_name\"} 1\n"), "body={body}");
    assert!(body.contains("mflow_scrapes_total 1\n"), "body={body}");
    assert!(!body.contains("evil"), "body={body}");
    assert_well_formed(&body);

    cancel.cancel();
}

#[tokio::test]
async fn metrics_is_unavailable_once_engine_stopped() {
    let cancel = CancellationToken::new();
    let (_handle, scrape, task) = engine::spawn(cancel.clone(), Arc::default());
    cancel.cancel();
    task.await.unwrap();

    let app = build_router(AppState::new(scrape, Arc::default()));
    let (status, _, _) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

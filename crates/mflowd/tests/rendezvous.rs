#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use mflow_core::{ErrorCode, LabelSet};
use mflowd::engine::{self, ApplyOutcome, Engine, Termination};
use mflowd::obs::metrics::DaemonMetrics;

mod common;
use common::{counter, gauge, T};

#[tokio::test]
async fn scrape_sees_every_sample_accepted_before_it() {
    let cancel = CancellationToken::new();
    let metrics = Arc::new(DaemonMetrics::default());
    let (handle, scrape, task) = engine::spawn(cancel.clone(), Arc::clone(&metrics));

    handle.submit(counter("sum_metric", 1.0)).await.unwrap();
    handle.submit(counter("sum_metric", 2.0)).await.unwrap();
    // apply() returns only after the engine has processed the sample
    handle.apply(counter("sum_metric", 0.0)).await.unwrap();

    let snap = scrape.snapshot().await.unwrap();
    assert_eq!(snap.registry().value("sum_metric", &LabelSet::new()), Some(3.0));
    assert_eq!(metrics.samples.get(&[("outcome", "applied")]), 3);
    assert_eq!(metrics.scrapes.get(&[]), 1);

    cancel.cancel();
    assert_eq!(task.await.unwrap(), Termination::Cancelled);
}

#[tokio::test]
async fn rejections_are_reported_to_the_submitter() {
    let cancel = CancellationToken::new();
    let metrics = Arc::new(DaemonMetrics::default());
    let (handle, scrape, _task) = engine::spawn(cancel.clone(), Arc::clone(&metrics));

    handle.apply(counter("same_name", 1.0)).await.unwrap();
    let err = handle.apply(gauge("same_name", 2.0, T)).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TypeConflict);

    handle.apply(gauge("g", 100.0, T + 1)).await.unwrap();
    let stale = handle.apply(gauge("g", 100500.0, T - 100500)).await.unwrap();
    assert_eq!(stale, ApplyOutcome::Stale);

    let snap = scrape.snapshot().await.unwrap();
    assert_eq!(snap.registry().value("same_name", &LabelSet::new()), Some(1.0));
    assert_eq!(snap.registry().value("g", &LabelSet::new()), Some(100.0));
    assert_eq!(metrics.samples.get(&[("outcome", "type_conflict")]), 1);
    assert_eq!(metrics.samples.get(&[("outcome", "stale")]), 1);

    cancel.cancel();
}

#[tokio::test]
async fn cancellation_terminates_the_loop() {
    let cancel = CancellationToken::new();
    let (handle, scrape, task) = engine::spawn(cancel.clone(), Arc::new(DaemonMetrics::default()));

    cancel.cancel();
    let t = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert_eq!(t, Termination::Cancelled);

    let err = scrape.snapshot().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::EngineUnavailable);
    let err = handle.submit(counter("c", 1.0)).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::EngineUnavailable);
}

#[tokio::test]
async fn dropping_all_clients_disconnects_the_loop() {
    let (handle, scrape, actor) = engine::channel(
        Engine::new(),
        CancellationToken::new(),
        Arc::new(DaemonMetrics::default()),
    );
    let task = tokio::spawn(actor.run());

    handle.apply(counter("c", 1.0)).await.unwrap();
    drop(handle);
    drop(scrape);

    let t = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert_eq!(t, Termination::Disconnected);
}

#[tokio::test]
async fn concurrent_producers_and_scrapes() {
    let cancel = CancellationToken::new();
    let (handle, scrape, _task) = engine::spawn(cancel.clone(), Arc::new(DaemonMetrics::default()));

    let mut producers = Vec::new();
    for _ in 0..8 {
        let handle = handle.clone();
        producers.push(tokio::spawn(async move {
            for _ in 0..50 {
                handle.submit(counter("hits", 1.0)).await.unwrap();
            }
        }));
    }

    let scraper = {
        let scrape = scrape.clone();
        tokio::spawn(async move {
            let mut last = 0.0;
            for _ in 0..20 {
                let snap = scrape.snapshot().await.unwrap();
                let v = snap.registry().value("hits", &LabelSet::new()).unwrap_or(0.0);
                assert!(v >= last, "counter went backwards: {v} < {last}");
                last = v;
                tokio::task::yield_now().await;
            }
        })
    };

    for p in producers {
        p.await.unwrap();
    }
    scraper.await.unwrap();

    handle.apply(counter("hits", 0.0)).await.unwrap();
    let snap = scrape.snapshot().await.unwrap();
    assert_eq!(snap.registry().value("hits", &LabelSet::new()), Some(400.0));

    cancel.cancel();
}

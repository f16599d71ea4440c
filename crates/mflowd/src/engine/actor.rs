//! Single-consumer engine loop.
//!
//! One task owns the `Engine`. Producers hand samples over a capacity-1
//! queue, scrapes arrive on their own queue, and the loop serves exactly
//! one message at a time, so registry writes never race each other and a
//! scrape always lands between two samples.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use mflow_core::error::{MflowError, Result};
use mflow_core::MetricSample;

use super::aggregate::{ApplyOutcome, Engine};
use super::scrape::{ScrapeClient, ScrapeSignal};
use crate::obs::metrics::DaemonMetrics;

/// tokio has no zero-capacity channel; 1 is the closest to a rendezvous.
const INPUT_QUEUE_CAPACITY: usize = 1;

/// Why the engine loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process-wide cancellation token fired.
    Cancelled,
    /// All producers and scrape clients were dropped.
    Disconnected,
}

struct Ingest {
    sample: MetricSample,
    reply: Option<oneshot::Sender<Result<ApplyOutcome>>>,
}

impl std::fmt::Debug for Ingest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingest").field("sample", &self.sample).finish()
    }
}

/// Producer side of the engine's input queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct EngineHandle {
    tx: mpsc::Sender<Ingest>,
}

impl EngineHandle {
    /// Fire-and-forget. Suspends until the engine takes the sample.
    pub async fn submit(&self, sample: MetricSample) -> Result<()> {
        self.tx
            .send(Ingest { sample, reply: None })
            .await
            .map_err(|_| MflowError::EngineUnavailable)
    }

    /// Submit and wait for the outcome (rejections come back as errors).
    pub async fn apply(&self, sample: MetricSample) -> Result<ApplyOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Ingest {
                sample,
                reply: Some(reply),
            })
            .await
            .map_err(|_| MflowError::EngineUnavailable)?;
        rx.await.map_err(|_| MflowError::EngineUnavailable)?
    }
}

pub struct EngineActor {
    engine: Engine,
    samples: mpsc::Receiver<Ingest>,
    scrapes: mpsc::Receiver<ScrapeSignal>,
    cancel: CancellationToken,
    metrics: Arc<DaemonMetrics>,
}

/// Build the actor and its two client ends without starting it.
pub fn channel(
    engine: Engine,
    cancel: CancellationToken,
    metrics: Arc<DaemonMetrics>,
) -> (EngineHandle, ScrapeClient, EngineActor) {
    let (sample_tx, samples) = mpsc::channel(INPUT_QUEUE_CAPACITY);
    let (scrape_tx, scrapes) = mpsc::channel(1);

    let actor = EngineActor {
        engine,
        samples,
        scrapes,
        cancel,
        metrics,
    };
    (
        EngineHandle { tx: sample_tx },
        ScrapeClient::new(scrape_tx),
        actor,
    )
}

/// Start a fresh engine on the current runtime.
pub fn spawn(
    cancel: CancellationToken,
    metrics: Arc<DaemonMetrics>,
) -> (EngineHandle, ScrapeClient, JoinHandle<Termination>) {
    let (handle, scrape, actor) = channel(Engine::new(), cancel, metrics);
    (handle, scrape, tokio::spawn(actor.run()))
}

impl EngineActor {
    pub async fn run(mut self) -> Termination {
        tracing::debug!("aggregation engine running");

        let mut samples_open = true;
        let mut scrapes_open = true;

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::info!("aggregation engine cancelled");
                    return Termination::Cancelled;
                }

                sig = self.scrapes.recv(), if scrapes_open => match sig {
                    Some(sig) => self.serve_scrape(sig),
                    None => scrapes_open = false,
                },

                ingest = self.samples.recv(), if samples_open => match ingest {
                    Some(ingest) => self.apply(ingest),
                    None => samples_open = false,
                },
            }

            if !samples_open && !scrapes_open {
                tracing::info!("aggregation engine disconnected");
                return Termination::Disconnected;
            }
        }
    }

    fn serve_scrape(&self, sig: ScrapeSignal) {
        tracing::debug!("sending aggregated metrics");
        self.metrics.scrapes.inc(&[]);
        if !sig.reply(self.engine.snapshot()) {
            tracing::debug!("scrape requester went away before the reply");
        }
    }

    fn apply(&mut self, ingest: Ingest) {
        let Ingest { sample, reply } = ingest;
        let res = self.engine.apply(&sample);

        let outcome = match &res {
            Ok(o) => o.as_str(),
            Err(e) => e.code().as_str(),
        };
        self.metrics.samples.inc(&[("outcome", outcome)]);

        match &res {
            Ok(ApplyOutcome::Applied) => {}
            Ok(ApplyOutcome::Stale) => {
                tracing::debug!(name = %sample.base_name(), ts = sample.timestamp(), "stale gauge sample dropped");
            }
            Err(e) => {
                tracing::warn!(name = %sample.base_name(), code = e.code().as_str(), "failed to aggregate metric: {e}");
            }
        }

        if let Some(reply) = reply {
            let _ = reply.send(res);
        }
    }
}

//! Source adapters.
//!
//! Each adapter turns raw records into `MetricSample`s through the core
//! normalizer and submits them to the engine. Per-record work runs in its
//! own task, bounded by a shared semaphore. Decode failures are logged,
//! counted, and dropped; they are never retried.

pub mod file;
pub mod pubsub;

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use mflow_core::error::{MflowError, Result};

use crate::config::{MflowConfig, SourceKind};
use crate::engine::EngineHandle;
use crate::obs::metrics::DaemonMetrics;

/// Shared decode-and-submit path for every adapter. Cheap to clone.
#[derive(Clone)]
pub struct Ingestor {
    engine: EngineHandle,
    limiter: Arc<Semaphore>,
    metrics: Arc<DaemonMetrics>,
    source: &'static str,
}

impl Ingestor {
    pub fn new(
        engine: EngineHandle,
        max_in_flight: usize,
        metrics: Arc<DaemonMetrics>,
        source: SourceKind,
    ) -> Self {
        Self {
            engine,
            limiter: Arc::new(Semaphore::new(max_in_flight)),
            metrics,
            source: source.as_str(),
        }
    }

    /// Wait for a free in-flight slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| MflowError::Internal("in-flight limiter closed".into()))
    }

    /// Decode one record and hand it to the engine.
    ///
    /// Undecodable records are reported here and yield `Ok(())`; the only
    /// error is a stopped engine.
    pub async fn ingest(&self, payload: &[u8], timestamp: i64) -> Result<()> {
        match mflow_core::decode(payload, timestamp) {
            Ok(sample) => self.engine.submit(sample).await,
            Err(e) => {
                self.metrics
                    .decode_failures
                    .inc(&[("source", self.source), ("code", e.code().as_str())]);
                tracing::warn!(
                    source = self.source,
                    orig = %String::from_utf8_lossy(payload),
                    "failed to parse metric update event: {e}"
                );
                Ok(())
            }
        }
    }
}

/// Wall clock in unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Run the adapter selected by the config until end-of-input, cancellation,
/// or a source failure.
pub async fn run_source(cfg: &MflowConfig, ingestor: Ingestor, cancel: CancellationToken) -> Result<()> {
    match cfg.source.kind {
        SourceKind::File => file::run_file_source(&cfg.source.locator, ingestor, cancel).await,
        SourceKind::Pubsub => {
            let path: pubsub::SubscriptionPath = cfg.source.locator.parse()?;
            let sub = pubsub::RestSubscription::new(
                &cfg.pubsub.endpoint,
                path,
                cfg.pubsub.bearer_token()?,
            )?;
            pubsub::run_pubsub_source(Arc::new(sub), ingestor, cancel, cfg.pubsub.max_messages).await
        }
    }
}

/// Run the source in the background. A failure stops this adapter only.
pub fn spawn_source(cfg: MflowConfig, ingestor: Ingestor, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let kind = cfg.source.kind.as_str();
        match run_source(&cfg, ingestor, cancel).await {
            Ok(()) => tracing::info!(source = kind, locator = %cfg.source.locator, "source finished"),
            Err(e) => tracing::error!(
                source = kind,
                locator = %cfg.source.locator,
                code = e.code().as_str(),
                "source failed: {e}"
            ),
        }
    })
}

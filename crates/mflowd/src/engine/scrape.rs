//! Scrape rendezvous.
//!
//! The exposition handler never touches the registry on its own. It sends a
//! `ScrapeSignal` into the engine loop and waits; the loop answers with a
//! `SnapshotHandle` on the signal's one-shot reply channel between two
//! samples. Every sample dequeued before the signal is fully applied, and
//! none is half-applied, when the handle is handed over.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use mflow_core::error::{MflowError, Result};

use super::registry::Registry;

/// Request for a snapshot, carrying its dedicated reply channel.
#[derive(Debug)]
pub struct ScrapeSignal {
    reply: oneshot::Sender<SnapshotHandle>,
}

impl ScrapeSignal {
    /// Hand the snapshot back. Returns false if the requester gave up.
    pub(crate) fn reply(self, snapshot: SnapshotHandle) -> bool {
        self.reply.send(snapshot).is_ok()
    }
}

/// Scrape side of the rendezvous. Cheap to clone.
#[derive(Clone, Debug)]
pub struct ScrapeClient {
    tx: mpsc::Sender<ScrapeSignal>,
}

impl ScrapeClient {
    pub(crate) fn new(tx: mpsc::Sender<ScrapeSignal>) -> Self {
        Self { tx }
    }

    /// Block until the engine loop accepts the signal and replies.
    pub async fn snapshot(&self) -> Result<SnapshotHandle> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ScrapeSignal { reply })
            .await
            .map_err(|_| MflowError::EngineUnavailable)?;
        rx.await.map_err(|_| MflowError::EngineUnavailable)
    }
}

/// Live, read-only reference to the engine's registry.
///
/// Not a copy: render it right after the rendezvous.
#[derive(Clone, Debug)]
pub struct SnapshotHandle {
    registry: Arc<Registry>,
}

impl SnapshotHandle {
    pub(crate) fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

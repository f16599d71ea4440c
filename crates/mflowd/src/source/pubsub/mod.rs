//! Subscription adapter.
//!
//! The adapter is written against the `Subscription` trait; `rest` provides
//! the Google Pub/Sub REST transport. Each pulled message is handled in its
//! own task: decode, submit, then ack. A message picked up after
//! cancellation is nacked without being submitted.

pub mod rest;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use mflow_core::error::{MflowError, Result};

use super::Ingestor;

pub use rest::RestSubscription;

/// Pause between pulls that returned nothing.
const EMPTY_PULL_BACKOFF: Duration = Duration::from_millis(500);

/// `project/subscription` locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPath {
    pub project: String,
    pub subscription: String,
}

impl SubscriptionPath {
    /// Fully qualified resource name.
    pub fn resource(&self) -> String {
        format!("projects/{}/subscriptions/{}", self.project, self.subscription)
    }
}

impl FromStr for SubscriptionPath {
    type Err = MflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [project, subscription] if !project.is_empty() && !subscription.is_empty() => Ok(Self {
                project: (*project).to_string(),
                subscription: (*subscription).to_string(),
            }),
            _ => Err(MflowError::Source(format!("can not parse pubsub source: {s}"))),
        }
    }
}

impl fmt::Display for SubscriptionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.subscription)
    }
}

/// One delivered message.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub data: Bytes,
    /// Publish time in unix seconds.
    pub publish_time: i64,
}

/// Pull-style subscription transport.
#[async_trait]
pub trait Subscription: Send + Sync {
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>>;
    async fn ack(&self, ack_id: &str) -> Result<()>;
    /// Negative ack: make the message available for redelivery now.
    async fn nack(&self, ack_id: &str) -> Result<()>;
}

/// What happened to a handled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Acked,
    Nacked,
}

/// Handle one inbound message.
pub async fn handle_message(
    sub: &dyn Subscription,
    ingestor: &Ingestor,
    cancel: &CancellationToken,
    msg: ReceivedMessage,
) -> Result<Delivery> {
    if cancel.is_cancelled() {
        sub.nack(&msg.ack_id).await?;
        return Ok(Delivery::Nacked);
    }

    tracing::debug!(ack_id = %msg.ack_id, "got new message");
    match ingestor.ingest(&msg.data, msg.publish_time).await {
        Ok(()) => {
            sub.ack(&msg.ack_id).await?;
            Ok(Delivery::Acked)
        }
        Err(e) => {
            sub.nack(&msg.ack_id).await?;
            Err(e)
        }
    }
}

/// Pull until cancelled. A failing pull is a source failure and ends the adapter.
pub async fn run_pubsub_source(
    sub: Arc<dyn Subscription>,
    ingestor: Ingestor,
    cancel: CancellationToken,
    max_messages: usize,
) -> Result<()> {
    let mut tasks: JoinSet<Result<Delivery>> = JoinSet::new();

    let res = loop {
        let batch = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Ok(()),
            batch = sub.pull(max_messages) => match batch {
                Ok(b) => b,
                Err(e) => break Err(e),
            },
        };

        if batch.is_empty() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Ok(()),
                _ = tokio::time::sleep(EMPTY_PULL_BACKOFF) => continue,
            }
        }

        for msg in batch {
            // No permit once cancelled: the task only nacks.
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = ingestor.acquire() => Some(permit?),
            };

            let sub = Arc::clone(&sub);
            let ingestor = ingestor.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permit;
                handle_message(sub.as_ref(), &ingestor, &cancel, msg).await
            });
        }

        while let Some(done) = tasks.try_join_next() {
            report(done);
        }
    };

    while let Some(done) = tasks.join_next().await {
        report(done);
    }
    res
}

fn report(done: std::result::Result<Result<Delivery>, tokio::task::JoinError>) {
    match done {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(code = e.code().as_str(), "failed to handle pubsub message: {e}"),
        Err(e) => tracing::warn!("pubsub message task failed: {e}"),
    }
}

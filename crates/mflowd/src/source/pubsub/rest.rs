//! Google Pub/Sub REST transport (`v1` pull / acknowledge / modifyAckDeadline).
//!
//! Works against production or the emulator; set `pubsub.endpoint`.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use mflow_core::error::{MflowError, Result};

use super::{ReceivedMessage, Subscription, SubscriptionPath};
use crate::source::unix_now;

pub struct RestSubscription {
    client: reqwest::Client,
    endpoint: String,
    path: SubscriptionPath,
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PullRequest {
    max_messages: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullResponse {
    #[serde(default)]
    received_messages: Vec<WireReceived>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReceived {
    ack_id: String,
    message: WireMessage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    data: String,
    #[serde(default)]
    publish_time: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AckRequest<'a> {
    ack_ids: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyAckDeadlineRequest<'a> {
    ack_ids: [&'a str; 1],
    ack_deadline_seconds: u32,
}

impl RestSubscription {
    pub fn new(endpoint: &str, path: SubscriptionPath, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MflowError::Source(format!("failed to create pubsub client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            path,
            token,
        })
    }

    fn url(&self, verb: &str) -> String {
        format!("{}/v1/{}:{verb}", self.endpoint, self.path.resource())
    }

    async fn post<T: Serialize + ?Sized>(&self, verb: &str, body: &T) -> Result<reqwest::Response> {
        let mut req = self.client.post(self.url(verb)).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| MflowError::Source(format!("pubsub {verb} ({}) failed: {e}", self.path)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MflowError::Source(format!(
                "pubsub {verb} ({}) returned {status}",
                self.path
            )));
        }
        Ok(resp)
    }
}

#[async_trait]
impl Subscription for RestSubscription {
    async fn pull(&self, max_messages: usize) -> Result<Vec<ReceivedMessage>> {
        let resp: PullResponse = self
            .post("pull", &PullRequest { max_messages })
            .await?
            .json()
            .await
            .map_err(|e| MflowError::Source(format!("pubsub pull ({}) bad response: {e}", self.path)))?;

        Ok(resp.received_messages.into_iter().map(into_message).collect())
    }

    async fn ack(&self, ack_id: &str) -> Result<()> {
        self.post("acknowledge", &AckRequest { ack_ids: [ack_id] })
            .await
            .map(|_| ())
    }

    async fn nack(&self, ack_id: &str) -> Result<()> {
        let body = ModifyAckDeadlineRequest {
            ack_ids: [ack_id],
            ack_deadline_seconds: 0,
        };
        self.post("modifyAckDeadline", &body).await.map(|_| ())
    }
}

fn into_message(r: WireReceived) -> ReceivedMessage {
    // Undecodable data becomes an empty payload, which the normalizer rejects.
    let data = STANDARD.decode(r.message.data.as_bytes()).unwrap_or_else(|e| {
        tracing::warn!(ack_id = %r.ack_id, "undecodable message data: {e}");
        Vec::new()
    });
    let publish_time = r
        .message
        .publish_time
        .as_deref()
        .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.timestamp())
        .unwrap_or_else(unix_now);

    ReceivedMessage {
        ack_id: r.ack_id,
        data: Bytes::from(data),
        publish_time,
    }
}

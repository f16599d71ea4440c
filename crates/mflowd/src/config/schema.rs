use std::net::SocketAddr;

use serde::Deserialize;
use mflow_core::error::{MflowError, Result};

use crate::source::pubsub::SubscriptionPath;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MflowConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub source: SourceSection,

    #[serde(default)]
    pub pubsub: PubSubSection,
}

impl Default for MflowConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            source: SourceSection::default(),
            pubsub: PubSubSection::default(),
        }
    }
}

impl MflowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MflowError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.source.validate()?;
        if self.source.kind == SourceKind::Pubsub {
            self.pubsub.validate()?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            MflowError::Config(format!(
                "server.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:6221".into()
}

/// Where metric-update events come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Replay a file of line-delimited JSON events.
    #[default]
    File,
    /// Pull from a Pub/Sub subscription (`project/subscription`).
    Pubsub,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::File => "file",
            SourceKind::Pubsub => "pubsub",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSection {
    #[serde(default)]
    pub kind: SourceKind,

    /// File path, or `project/subscription` for Pub/Sub.
    #[serde(default)]
    pub locator: String,

    /// Upper bound on concurrently running decode-and-submit tasks.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            locator: String::new(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl SourceSection {
    pub fn validate(&self) -> Result<()> {
        if self.locator.trim().is_empty() {
            return Err(MflowError::Config("source.locator must not be empty".into()));
        }
        if !(1..=65536).contains(&self.max_in_flight) {
            return Err(MflowError::Config(
                "source.max_in_flight must be between 1 and 65536".into(),
            ));
        }
        if self.kind == SourceKind::Pubsub {
            self.locator
                .parse::<SubscriptionPath>()
                .map_err(|e| MflowError::Config(e.to_string()))?;
        }
        Ok(())
    }
}

fn default_max_in_flight() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PubSubSection {
    #[serde(default = "default_pubsub_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Name of the environment variable holding an OAuth access token.
    #[serde(default)]
    pub bearer_token_env: Option<String>,
}

impl Default for PubSubSection {
    fn default() -> Self {
        Self {
            endpoint: default_pubsub_endpoint(),
            max_messages: default_max_messages(),
            bearer_token_env: None,
        }
    }
}

impl PubSubSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(MflowError::Config(
                "pubsub.endpoint must be an http(s) url".into(),
            ));
        }
        if !(1..=1000).contains(&self.max_messages) {
            return Err(MflowError::Config(
                "pubsub.max_messages must be between 1 and 1000".into(),
            ));
        }
        Ok(())
    }

    /// Resolve the bearer token, if one is configured.
    pub fn bearer_token(&self) -> Result<Option<String>> {
        match &self.bearer_token_env {
            None => Ok(None),
            Some(var) => std::env::var(var).map(Some).map_err(|_| {
                MflowError::Config(format!("pubsub.bearer_token_env: {var} is not set"))
            }),
        }
    }
}

fn default_pubsub_endpoint() -> String {
    "https://pubsub.googleapis.com".into()
}
fn default_max_messages() -> usize {
    100
}

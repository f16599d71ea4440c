//! Command-line interface for mflowd.
//!
//! Precedence: flags > config file > defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use mflow_core::error::Result;

use crate::config::{self, MflowConfig, SourceKind};

/// Metrics flow: aggregate metric-update events and expose them to Prometheus.
#[derive(Parser, Debug)]
#[command(name = "mflowd", version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "MFLOWD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to expose for Prometheus to scrape the metrics
    #[arg(short, long, env = "MFLOWD_PORT")]
    pub port: Option<u16>,

    /// Type of metric update events source
    #[arg(short, long, value_enum, env = "MFLOWD_SOURCE")]
    pub source: Option<SourceKind>,

    /// Turn on verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// File path, or project/subscription for pubsub
    pub locator: Option<String>,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Load the config file (if any), apply flag overrides, then validate.
    pub fn load_config(&self) -> Result<MflowConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::parse_file(path)?,
            None => MflowConfig::default(),
        };

        if let Some(port) = self.port {
            let mut addr: SocketAddr = cfg.server.listen_addr()?;
            addr.set_port(port);
            cfg.server.listen = addr.to_string();
        }
        if let Some(kind) = self.source {
            cfg.source.kind = kind;
        }
        if let Some(locator) = &self.locator {
            cfg.source.locator = locator.clone();
        }

        cfg.validate()?;
        Ok(cfg)
    }
}

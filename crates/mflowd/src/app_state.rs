//! Shared application state for the HTTP side of mflowd.
//!
//! Holds no aggregation state: scrapes go through the rendezvous client.

use std::sync::Arc;

use crate::engine::ScrapeClient;
use crate::obs::metrics::DaemonMetrics;

#[derive(Clone)]
pub struct AppState {
    scrape: ScrapeClient,
    metrics: Arc<DaemonMetrics>,
}

impl AppState {
    pub fn new(scrape: ScrapeClient, metrics: Arc<DaemonMetrics>) -> Self {
        Self { scrape, metrics }
    }

    pub fn scrape(&self) -> &ScrapeClient {
        &self.scrape
    }

    pub fn metrics(&self) -> &DaemonMetrics {
        &self.metrics
    }
}

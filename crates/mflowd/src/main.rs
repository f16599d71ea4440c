//! mflowd
//!
//! - Source adapter (file replay or Pub/Sub) -> normalizer -> engine input queue
//! - Aggregation engine: single task owning all metric state
//! - HTTP: /metrics (scrape rendezvous + exposition), /status
//! - Ctrl-C cancels everything through one token

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use mflow_core::error::{MflowError, Result};
use mflowd::{app_state, cli::Cli, engine, obs::metrics::DaemonMetrics, router, source};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    fmt().with_env_filter(filter).init();

    let cfg = cli.load_config()?;
    let listen = cfg.server.listen_addr()?;

    let cancel = CancellationToken::new();
    let metrics = Arc::new(DaemonMetrics::default());

    // ---- engine
    let (engine, scrape, engine_task) = engine::spawn(cancel.clone(), Arc::clone(&metrics));

    // ---- source (failure stops the adapter only)
    let ingestor = source::Ingestor::new(
        engine,
        cfg.source.max_in_flight,
        Arc::clone(&metrics),
        cfg.source.kind,
    );
    let source_task = source::spawn_source(cfg, ingestor, cancel.clone());

    // ---- http
    let state = app_state::AppState::new(scrape, metrics);
    let app = router::build_router(state);

    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    tracing::info!(%listen, "mflowd starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MflowError::Internal(format!("failed to bind {listen}: {e}")))?;

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MflowError::Internal(format!("server failed: {e}")))?;

    cancel.cancel();
    match engine_task.await {
        Ok(t) => tracing::info!(termination = ?t, "aggregation engine stopped"),
        Err(e) => tracing::error!("aggregation engine task failed: {e}"),
    }
    let _ = source_task.await;
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        return;
    }
    tracing::info!("shutting down");
    cancel.cancel();
}

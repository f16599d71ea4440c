//! File replay adapter: one JSON event per line.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use mflow_core::error::{MflowError, Result};

use super::{unix_now, Ingestor};

/// Replay `path` line by line. Each line is decoded and submitted by its own
/// task so a slow decode never holds up reading. Returns once every line's
/// task has finished, or early on cancellation.
pub async fn run_file_source(
    path: impl AsRef<Path>,
    ingestor: Ingestor,
    cancel: CancellationToken,
) -> Result<()> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading metric update events from file");

    let file = File::open(path)
        .await
        .map_err(|e| MflowError::Source(format!("open {} failed: {e}", path.display())))?;
    let mut lines = BufReader::new(file).lines();
    let mut tasks: JoinSet<Result<()>> = JoinSet::new();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => return stop(tasks).await,
            line = lines.next_line() => line
                .map_err(|e| MflowError::Source(format!("read {} failed: {e}", path.display())))?,
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return stop(tasks).await,
            permit = ingestor.acquire() => permit?,
        };

        let ingestor = ingestor.clone();
        let ts = unix_now();
        tasks.spawn(async move {
            let _permit = permit;
            ingestor.ingest(line.as_bytes(), ts).await
        });

        while let Some(done) = tasks.try_join_next() {
            check(done)?;
        }
    }

    loop {
        let done = tokio::select! {
            biased;
            _ = cancel.cancelled() => return stop(tasks).await,
            done = tasks.join_next() => done,
        };
        let Some(done) = done else { break };
        check(done)?;
    }

    tracing::debug!(path = %path.display(), "no more metric update events");
    Ok(())
}

fn check(done: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    done.map_err(|e| MflowError::Internal(format!("ingest task failed: {e}")))?
}

async fn stop(mut tasks: JoinSet<Result<()>>) -> Result<()> {
    tracing::debug!("file source cancelled");
    tasks.shutdown().await;
    Ok(())
}

//! Operational HTTP endpoints.
//!
//! - `/status`  : liveness
//! - `/metrics` : aggregated metrics, Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;
use crate::obs::exposition;

pub async fn status() -> impl IntoResponse {
    (StatusCode::OK, "ok\n")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    tracing::debug!("prometheus wants to scrape some metrics");

    let snapshot = match state.scrape().snapshot().await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(code = e.code().as_str(), "scrape failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };

    let mut body = String::new();
    exposition::render(&snapshot, &mut body);
    state.metrics().render(&mut body);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
        body,
    )
        .into_response()
}

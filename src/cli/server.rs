//! HTTP server mode answering Zabbix HTTP agent items

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::BridgeConfig;
use crate::engine::{MetricsBridge, MetricsRequest};
use crate::error::{Error, ErrorCategory, Result};
use crate::http::PayloadSource;

/// Start the HTTP server
pub async fn serve(config: BridgeConfig) -> Result<()> {
    let bridge = MetricsBridge::from_config(&config)?;
    let app = router(bridge);

    let addr = config.listen;
    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}

/// Build the router around a bridge
pub fn router<S: PayloadSource + 'static>(bridge: MetricsBridge<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", post(metrics::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(bridge))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Pull and decode tuner metrics for the device named in the body
async fn metrics<S: PayloadSource + 'static>(
    State(bridge): State<Arc<MetricsBridge<S>>>,
    body: Bytes,
) -> Response {
    let request = match MetricsRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match bridge.collect(&request).await {
        Ok(result) => (StatusCode::OK, Json(result.records)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Map a bridge error to the inbound response
pub fn error_response(err: &Error) -> Response {
    let status = status_for(err.category());
    match err.category() {
        ErrorCategory::Internal => error!("Metrics request failed: {err}"),
        ErrorCategory::Client => info!("Rejected metrics request: {err}"),
        _ => warn!("Device request failed: {err}"),
    }

    let body = match err.upstream_status() {
        Some(upstream) => json!({ "error": err.to_string(), "status": upstream }),
        None => json!({ "error": err.to_string() }),
    };

    (status, Json(body)).into_response()
}

fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Client => StatusCode::BAD_REQUEST,
        ErrorCategory::Upstream | ErrorCategory::Connection => StatusCode::BAD_GATEWAY,
        ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

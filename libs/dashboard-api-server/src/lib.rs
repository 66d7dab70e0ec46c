mod http;
mod sse;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crossroad_stats::StatsBackend;
use tracklet_relay::{RelayOptions, UpstreamConnector};

#[derive(Clone)]
pub struct AppState {
    /// Фабрика upstream-соединений; один relay instance на SSE клиента.
    pub connector: Arc<dyn UpstreamConnector>,
    pub stats: Arc<StatsBackend>,
    /// Topic по умолчанию, когда клиент не передал `?topic=`.
    pub default_topic: String,
    pub relay: RelayOptions,
}

/// Dashboard HTTP + SSE API сервер.
pub async fn run(port: u16, state: AppState, shutdown: CancellationToken) -> Result<(), String> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handle_home))
        .route("/health", get(http::handle_health))
        .route("/api/status", get(http::handle_status))
        .route("/api/crossroads", get(http::handle_crossroads))
        .route("/api/crossroads/{id}/stats", get(http::handle_crossroad_stats))
        .route("/api/stream", get(sse::handle_stream))
        .fallback(http::handle_not_found)
        .with_state(state)
}

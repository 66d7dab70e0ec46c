use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde_json::json;

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  REST: boilerplate dashboard routes
// ═══════════════════════════════════════════════════════════════

const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Dashboard - Smart City Rome</title>
</head>
<body>
    <h1>Smart City Rome Dashboard</h1>
    <h2>Available Endpoints:</h2>
    <ul>
        <li><code>GET /health</code> - Health check</li>
        <li><code>GET /api/status</code> - API status</li>
        <li><code>GET /api/crossroads</code> - Monitored crossroads</li>
        <li><code>GET /api/crossroads/{id}/stats</code> - Crossroad aggregates</li>
        <li><code>GET /api/stream?topic=...</code> - Live tracklet stream (SSE)</li>
    </ul>
</body>
</html>
"#;

pub(crate) async fn handle_home() -> impl IntoResponse {
    Html(HOME_PAGE)
}

pub(crate) async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "message": "Server is running",
    }))
}

pub(crate) async fn handle_status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "Smart City Rome Dashboard",
        "version": "1.0.0",
    }))
}

// --- GET /api/crossroads ---

pub(crate) async fn handle_crossroads(State(state): State<AppState>) -> impl IntoResponse {
    match state.stats.crossroads().await {
        Ok(list) => Json(list).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "crossroads query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!([]))).into_response()
        }
    }
}

// --- GET /api/crossroads/{id}/stats ---

pub(crate) async fn handle_crossroad_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.stats.crossroad_stats(&id).await {
        Ok(cards) => Json(json!({ "cards": cards })).into_response(),
        Err(e) => {
            tracing::error!(crossroad = %id, error = %e, "stats query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

// --- Fallback: JSON 404 ---

pub(crate) async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "The requested resource was not found",
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_payload() {
        let resp = handle_health().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn status_payload() {
        let resp = handle_status().await.into_response();
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "Smart City Rome Dashboard");
        assert_eq!(body["version"], "1.0.0");
    }

    #[tokio::test]
    async fn not_found_payload() {
        let resp = handle_not_found().await.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn home_lists_endpoints() {
        let resp = handle_home().await.into_response();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/stream"));
        assert!(html.contains("/api/crossroads"));
    }
}

//! Axum router construction.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::hub::HubHandle;
use super::ws;

/// Build the router:
/// - `GET /ws` -- game `WebSocket`
/// - `GET /health` -- liveness check with room and connection counts
///
/// CORS allows any origin, so a game page served from elsewhere can connect.
pub fn build_router(hub: HubHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_game))
        .route("/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

async fn health(State(hub): State<HubHandle>) -> (StatusCode, Json<serde_json::Value>) {
    match hub.stats().await {
        Some(stats) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "rooms": stats.rooms,
                "playing": stats.playing,
                "connections": stats.connections,
            })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "unavailable"})),
        ),
    }
}

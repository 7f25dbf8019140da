use crate::app::AppState;
use crate::history::{get_chat_history, save_chat_message};
use crate::signaling::ws_handler;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: Arc<AppState>, cors_origin: Option<&str>) -> Result<Router> {
    Ok(Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/chat/message", post(save_chat_message))
        .route("/api/chat/{room_id}", get(get_chat_history))
        .route("/health", get(health))
        .layer(cors_layer(cors_origin)?)
        .with_state(state))
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    };

    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("Invalid CORS origin '{}'", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match state.coordinator.stats().await {
        Ok(stats) => Json(json!({
            "status": "ok",
            "connections": stats.connections,
            "rooms": stats.rooms,
        }))
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "down", "error": e.to_string() })),
        )
            .into_response(),
    }
}

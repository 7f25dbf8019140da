use crate::app::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use callroom_core::{ChatDraft, RoomId};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

/// `GET /api/chat/{room_id}`: persisted chat of one room, oldest first.
pub async fn get_chat_history(
    Path(room_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let room = RoomId::from(room_id);

    match state.history.list_by_room(&room).await {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(e) => {
            error!(%room, "Error fetching chat history: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to get chat history" })),
            )
                .into_response()
        }
    }
}

/// `POST /api/chat/message`: store one chat message and echo it back.
pub async fn save_chat_message(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<ChatDraft>,
) -> Response {
    if let Some(field) = draft.empty_field() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Missing '{}'", field) })),
        )
            .into_response();
    }

    let message = draft.stamp();
    match state.history.append(message.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => {
            error!(room = %message.room, "Error saving message: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

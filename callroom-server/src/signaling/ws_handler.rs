use crate::app::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use callroom_core::{ClientMessage, UserId};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    /// Пользователь, установленный внешним слоем авторизации, если есть.
    pub user: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let user_id = params.user.filter(|u| !u.is_empty()).map(UserId::from);

    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

async fn handle_socket(socket: WebSocket, user_id: Option<UserId>, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = state.gateway.accept(tx);
    info!(%connection_id, user = ?user_id, "New WebSocket connection");

    if let Err(e) = state
        .coordinator
        .handle_connect(connection_id.clone(), user_id)
        .await
    {
        error!(%connection_id, "Rejecting connection: {}", e);
        state.gateway.release(&connection_id);
        return;
    }
    state.gateway.greet(&connection_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let coordinator = state.coordinator.clone();
        let connection_id = connection_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match ClientMessage::decode(text.as_str()) {
                        Ok(message) => {
                            if let Err(e) = coordinator
                                .handle_inbound_message(connection_id.clone(), message)
                                .await
                            {
                                error!(%connection_id, "Coordinator died: {}", e);
                                break;
                            }
                        }
                        Err(e) => warn!(%connection_id, "Dropping malformed message: {}", e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    let writer_finished = tokio::select! {
        _ = &mut send_task => true,
        _ = &mut recv_task => false,
    };
    if writer_finished {
        // The reader must be fully stopped so none of its messages can be
        // queued behind the disconnect below.
        recv_task.abort();
        let _ = recv_task.await;
    } else {
        send_task.abort();
    }

    if let Err(e) = state
        .coordinator
        .handle_disconnect(connection_id.clone())
        .await
    {
        error!(%connection_id, "Failed to report disconnect: {}", e);
    }
    state.gateway.release(&connection_id);
    info!(%connection_id, "WebSocket disconnected");
}

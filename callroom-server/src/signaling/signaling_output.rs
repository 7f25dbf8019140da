use async_trait::async_trait;
use callroom_core::{ConnectionId, ServerMessage};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),

    #[error("outbound channel for {0} is closed")]
    ChannelClosed(ConnectionId),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Трейт, который реализует внешняя система (WebSocket сервер),
/// чтобы координатор мог отправлять сообщения клиентам.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Отправить одно сообщение конкретному соединению. Подтверждения нет:
    /// `Ok` значит, что сообщение поставлено в очередь, а не прочитано клиентом.
    async fn send(
        &self,
        connection_id: &ConnectionId,
        message: &ServerMessage,
    ) -> Result<(), DeliveryError>;

    /// Отправить каждому получателю независимо. Ошибка для одного
    /// получателя логируется и не мешает остальным.
    async fn fan_out(&self, recipients: &[ConnectionId], message: &ServerMessage) {
        for connection_id in recipients {
            if let Err(e) = self.send(connection_id, message).await {
                warn!(%connection_id, op = message.op(), "Dropped outbound message: {}", e);
            }
        }
    }
}

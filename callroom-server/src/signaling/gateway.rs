use crate::signaling::{DeliveryError, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes};
use callroom_core::{ConnectionId, IceServerConfig, ServerMessage};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct GatewayInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Реестр живых WebSocket соединений.
///
/// Соединение представлено отправляющей половиной очереди его задачи записи,
/// доставка никогда не трогает сокет напрямую.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                connections: DashMap::new(),
                ice_servers,
            }),
        }
    }

    /// Зарегистрировать новое соединение и выдать ему идентификатор.
    pub fn accept(&self, tx: mpsc::UnboundedSender<Message>) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.inner.connections.insert(connection_id.clone(), tx);
        connection_id
    }

    /// Поставить в очередь welcome и ICE конфигурацию для нового соединения.
    pub fn greet(&self, connection_id: &ConnectionId) {
        let welcome = ServerMessage::Welcome {
            connection_id: connection_id.clone(),
        };
        let ice = ServerMessage::IceConfig {
            ice_servers: self.inner.ice_servers.clone(),
        };

        for msg in [welcome, ice] {
            if let Err(e) = encode(&msg).and_then(|frame| self.deliver(connection_id, frame)) {
                warn!(%connection_id, "Failed to greet connection: {}", e);
            }
        }
    }

    pub fn release(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.inner.connections.contains_key(connection_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    fn deliver(&self, connection_id: &ConnectionId, frame: Utf8Bytes) -> Result<(), DeliveryError> {
        let Some(peer) = self.inner.connections.get(connection_id) else {
            return Err(DeliveryError::UnknownConnection(connection_id.clone()));
        };
        peer.send(Message::Text(frame))
            .map_err(|_| DeliveryError::ChannelClosed(connection_id.clone()))
    }
}

fn encode(message: &ServerMessage) -> Result<Utf8Bytes, DeliveryError> {
    Ok(serde_json::to_string(message)?.into())
}

#[async_trait]
impl SignalingOutput for Gateway {
    async fn send(
        &self,
        connection_id: &ConnectionId,
        message: &ServerMessage,
    ) -> Result<(), DeliveryError> {
        self.deliver(connection_id, encode(message)?)
    }

    // Encodes once and shares the frame between recipients.
    async fn fan_out(&self, recipients: &[ConnectionId], message: &ServerMessage) {
        let frame = match encode(message) {
            Ok(frame) => frame,
            Err(e) => {
                error!(op = message.op(), "Failed to serialize signal message: {}", e);
                return;
            }
        };

        for connection_id in recipients {
            match self.deliver(connection_id, frame.clone()) {
                Ok(()) => debug!(%connection_id, op = message.op(), "Delivered"),
                Err(e) => warn!(%connection_id, op = message.op(), "Dropped outbound message: {}", e),
            }
        }
    }
}

use callroom_core::{ClientMessage, ConnectionId, RoomId, UserId};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::oneshot;

/// Команды, поступающие в координатор от шлюза и HTTP-слоя.
#[derive(Debug)]
pub enum RoomCommand {
    /// Рукопожатие WebSocket завершено.
    Connect {
        connection_id: ConnectionId,
        user_id: Option<UserId>,
    },

    /// Сигнал о разрыве WebSocket соединения: выйти из всех комнат.
    Disconnect { connection_id: ConnectionId },

    /// Разобранный кадр от клиента.
    Inbound {
        connection_id: ConnectionId,
        message: ClientMessage,
    },

    RoomMembers {
        room: RoomId,
        reply: oneshot::Sender<Option<Vec<ConnectionId>>>,
    },

    Stats {
        reply: oneshot::Sender<CoordinatorStats>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub connections: usize,
    pub rooms: usize,
}

#[derive(Debug, Error)]
#[error("room coordinator is no longer running")]
pub struct CoordinatorClosed;

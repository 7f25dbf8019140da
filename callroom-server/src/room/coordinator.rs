use crate::history::HistoryStore;
use crate::room::room_command::{CoordinatorClosed, CoordinatorStats, RoomCommand};
use crate::room::room_table::{JoinOutcome, LeaveOutcome, RoomTable};
use crate::signaling::SignalingOutput;
use callroom_core::{
    ChatMessage, ClientMessage, ConnectionId, RoomId, ServerMessage, UserId, unix_millis,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Единственный владелец состояния комнат.
///
/// Каждая команда выполняется целиком до того, как из очереди берётся следующая,
/// поэтому маршрутизация никогда не видит наполовину применённый join, leave или disconnect.
/// Рассылка только кладёт сообщения в очереди соединений и не ждёт сокет.
pub struct Coordinator {
    table: RoomTable,
    command_rx: mpsc::Receiver<RoomCommand>,
    output: Arc<dyn SignalingOutput>,
    history: Arc<dyn HistoryStore>,
}

impl Coordinator {
    pub fn new(
        command_rx: mpsc::Receiver<RoomCommand>,
        output: Arc<dyn SignalingOutput>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            table: RoomTable::new(),
            command_rx,
            output,
            history,
        }
    }

    /// Запустить координатор в текущем рантайме и вернуть его хэндл.
    pub fn spawn(
        output: Arc<dyn SignalingOutput>,
        history: Arc<dyn HistoryStore>,
        queue_capacity: usize,
    ) -> CoordinatorHandle {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        tokio::spawn(Self::new(rx, output, history).run());
        CoordinatorHandle::new(tx)
    }

    pub async fn run(mut self) {
        info!("Room coordinator started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!(
            "Command channel closed. Room coordinator stopped with {} rooms.",
            self.table.room_count()
        );
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Connect {
                connection_id,
                user_id,
            } => {
                if self.table.connect(connection_id.clone(), user_id) {
                    debug!(%connection_id, "Connection registered");
                }
            }

            RoomCommand::Disconnect { connection_id } => {
                let user = self.table.user_of(&connection_id).cloned();
                let rooms = self.table.rooms_of(&connection_id);
                let closed = self.table.disconnect(&connection_id);
                info!(
                    %connection_id,
                    user = ?user,
                    "Connection removed from {} room(s), {} closed",
                    rooms.len(),
                    closed.len()
                );
                for room in closed {
                    info!(%room, "Room closed");
                }
            }

            RoomCommand::Inbound {
                connection_id,
                message,
            } => self.route(connection_id, message).await,

            RoomCommand::RoomMembers { room, reply } => {
                let _ = reply.send(self.table.members(&room));
            }

            RoomCommand::Stats { reply } => {
                let _ = reply.send(CoordinatorStats {
                    connections: self.table.connection_count(),
                    rooms: self.table.room_count(),
                });
            }
        }
    }

    async fn route(&mut self, from: ConnectionId, message: ClientMessage) {
        debug!(connection_id = %from, op = message.op(), "Routing message");

        match message {
            ClientMessage::Join { room } => self.join(&from, &room),
            ClientMessage::Leave { room } => self.leave(&from, &room),

            ClientMessage::Offer { room, sdp } => {
                self.relay(&room, &from, ServerMessage::Offer { sdp }).await
            }
            ClientMessage::Answer { room, sdp } => {
                self.relay(&room, &from, ServerMessage::Answer { sdp }).await
            }
            ClientMessage::IceCandidate { room, candidate } => {
                self.relay(&room, &from, ServerMessage::IceCandidate { candidate })
                    .await
            }

            ClientMessage::Typing { room, user_id } => {
                self.relay(&room, &from, ServerMessage::Typing { user_id })
                    .await
            }
            ClientMessage::StopTyping { room, user_id } => {
                self.relay(&room, &from, ServerMessage::StopTyping { user_id })
                    .await
            }

            ClientMessage::ChatText {
                room,
                text,
                sender,
                receiver,
                timestamp,
            } => {
                let chat = ChatMessage {
                    text,
                    sender,
                    receiver,
                    room: room.clone(),
                    timestamp: timestamp.unwrap_or_else(unix_millis),
                };
                self.persist(chat.clone());
                self.relay(&room, &from, ServerMessage::ChatText(chat)).await
            }

            // Legacy in-call chat: every other connection, whatever room it is in.
            ClientMessage::CallChat { text, sender, sid } => {
                let recipients = self.table.everyone_except(&from);
                self.output
                    .fan_out(&recipients, &ServerMessage::CallChat { text, sender, sid })
                    .await;
            }
        }
    }

    fn join(&mut self, connection_id: &ConnectionId, room: &RoomId) {
        match self.table.join(connection_id, room) {
            JoinOutcome::Created => info!(%connection_id, %room, "Room created"),
            JoinOutcome::Joined => info!(%connection_id, %room, "Joined room"),
            JoinOutcome::AlreadyMember => debug!(%connection_id, %room, "Already in room"),
        }
    }

    fn leave(&mut self, connection_id: &ConnectionId, room: &RoomId) {
        match self.table.leave(connection_id, room) {
            LeaveOutcome::Closed => info!(%connection_id, %room, "Left room, room closed"),
            LeaveOutcome::Left => info!(%connection_id, %room, "Left room"),
            LeaveOutcome::NotMember => debug!(%connection_id, %room, "Leave ignored, not a member"),
        }
    }

    /// Отправить всем участникам `room`, кроме отправителя.
    async fn relay(&self, room: &RoomId, from: &ConnectionId, message: ServerMessage) {
        if !self.table.is_member(from, room) {
            debug!(
                connection_id = %from,
                %room,
                op = message.op(),
                "Sender is not a member, relaying anyway"
            );
        }
        let recipients = self.table.peers_of(room, from);
        if recipients.is_empty() {
            debug!(%room, op = message.op(), "No recipients, dropping");
            return;
        }
        self.output.fan_out(&recipients, &message).await;
    }

    /// Передать сообщение чата в хранилище истории, не дожидаясь записи.
    fn persist(&self, chat: ChatMessage) {
        let history = self.history.clone();
        tokio::spawn(async move {
            let room = chat.room.clone();
            if let Err(e) = history.append(chat).await {
                error!(%room, "Failed to persist chat message: {}", e);
            }
        });
    }
}

/// Клонируемый вход в запущенный [`Coordinator`].
#[derive(Clone)]
pub struct CoordinatorHandle {
    command_tx: mpsc::Sender<RoomCommand>,
}

impl CoordinatorHandle {
    pub fn new(command_tx: mpsc::Sender<RoomCommand>) -> Self {
        Self { command_tx }
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), CoordinatorClosed> {
        self.command_tx.send(cmd).await.map_err(|_| CoordinatorClosed)
    }

    pub async fn handle_connect(
        &self,
        connection_id: ConnectionId,
        user_id: Option<UserId>,
    ) -> Result<(), CoordinatorClosed> {
        self.send(RoomCommand::Connect {
            connection_id,
            user_id,
        })
        .await
    }

    pub async fn handle_disconnect(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), CoordinatorClosed> {
        self.send(RoomCommand::Disconnect { connection_id }).await
    }

    pub async fn handle_inbound_message(
        &self,
        connection_id: ConnectionId,
        message: ClientMessage,
    ) -> Result<(), CoordinatorClosed> {
        self.send(RoomCommand::Inbound {
            connection_id,
            message,
        })
        .await
    }

    /// Текущие участники `room` или `None`, если комнаты нет.
    pub async fn room_members(
        &self,
        room: &RoomId,
    ) -> Result<Option<Vec<ConnectionId>>, CoordinatorClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::RoomMembers {
            room: room.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| CoordinatorClosed)
    }

    pub async fn room_exists(&self, room: &RoomId) -> Result<bool, CoordinatorClosed> {
        Ok(self.room_members(room).await?.is_some())
    }

    /// Работает и как барьер: все команды, поставленные в очередь раньше, уже применены.
    pub async fn stats(&self) -> Result<CoordinatorStats, CoordinatorClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Stats { reply }).await?;
        rx.await.map_err(|_| CoordinatorClosed)
    }
}

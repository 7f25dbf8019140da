use async_trait::async_trait;
use callroom_core::{ChatMessage, RoomId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("history backend unavailable: {0}")]
    Unavailable(String),

    #[error("history backend rejected the message: {0}")]
    Rejected(String),
}

/// Durable chat history. Implemented outside this crate for real databases.
#[async_trait]
pub trait HistoryStore: Send + Sync + 'static {
    async fn append(&self, message: ChatMessage) -> Result<(), StorageError>;

    /// Messages of `room` ordered by timestamp, oldest first.
    async fn list_by_room(&self, room: &RoomId) -> Result<Vec<ChatMessage>, StorageError>;
}

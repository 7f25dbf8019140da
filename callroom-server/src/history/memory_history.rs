use crate::history::{HistoryStore, StorageError};
use async_trait::async_trait;
use callroom_core::{ChatMessage, RoomId};
use dashmap::DashMap;

/// Process-local history store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryHistory {
    rooms: DashMap<RoomId, Vec<ChatMessage>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, message: ChatMessage) -> Result<(), StorageError> {
        self.rooms
            .entry(message.room.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn list_by_room(&self, room: &RoomId) -> Result<Vec<ChatMessage>, StorageError> {
        let mut messages = self
            .rooms
            .get(room)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        // Stable: equal timestamps keep arrival order.
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

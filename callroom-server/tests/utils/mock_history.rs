use async_trait::async_trait;
use callroom_core::{ChatMessage, RoomId};
use callroom_server::{HistoryStore, StorageError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// History store that can be switched into a failing state.
#[derive(Clone, Default)]
pub struct MockHistory {
    stored: Arc<Mutex<Vec<ChatMessage>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MockHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let history = Self::default();
        history.failing.store(true, Ordering::SeqCst);
        history
    }

    pub async fn stored(&self) -> Vec<ChatMessage> {
        self.stored.lock().await.clone()
    }

    /// Wait until `append` has been called at least `count` times.
    pub async fn wait_for_attempts(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        while start.elapsed() < timeout {
            if self.attempts.load(Ordering::SeqCst) >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.attempts.load(Ordering::SeqCst) >= count
    }
}

#[async_trait]
impl HistoryStore for MockHistory {
    async fn append(&self, message: ChatMessage) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("mock outage".into()));
        }
        self.stored.lock().await.push(message);
        Ok(())
    }

    async fn list_by_room(&self, room: &RoomId) -> Result<Vec<ChatMessage>, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("mock outage".into()));
        }
        let mut messages: Vec<ChatMessage> = self
            .stored
            .lock()
            .await
            .iter()
            .filter(|m| &m.room == room)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

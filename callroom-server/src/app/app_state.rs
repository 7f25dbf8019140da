use crate::history::HistoryStore;
use crate::room::CoordinatorHandle;
use crate::signaling::Gateway;
use std::sync::Arc;

/// Shared state behind every HTTP and WebSocket handler.
pub struct AppState {
    pub gateway: Gateway,
    pub coordinator: CoordinatorHandle,
    pub history: Arc<dyn HistoryStore>,
}


use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Level;

use callroom_server::{Coordinator, CoordinatorHandle, RoomCommand};

use crate::utils::{MockHistory, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_coordinator() -> (CoordinatorHandle, MockSignalingOutput, MockHistory) {
    create_test_coordinator_with(MockHistory::new())
}

pub fn create_test_coordinator_with(
    history: MockHistory,
) -> (CoordinatorHandle, MockSignalingOutput, MockHistory) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RoomCommand>(100);
    let output = MockSignalingOutput::new();

    let coordinator = Coordinator::new(cmd_rx, Arc::new(output.clone()), Arc::new(history.clone()));

    tokio::spawn(async move {
        coordinator.run().await;
    });

    (CoordinatorHandle::new(cmd_tx), output, history)
}

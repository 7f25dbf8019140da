use std::time::{Duration, Instant};

use crate::integration::gateway_tests::start_server;
use crate::integration::init_tracing;
use crate::utils::{SIGNAL_TIMEOUT_MS, TestClient, settle, wait_for_member_count};

#[tokio::test]
async fn test_released_connection_cleanup() {
    init_tracing();

    let (addr, state) = start_server().await;
    let mut x = TestClient::connect(addr).await.expect("client x");
    let mut y = TestClient::connect(addr).await.expect("client y");

    x.send_text(r#"{"op":"join","d":{"room":"ABC123"}}"#)
        .await
        .unwrap();
    y.send_text(r#"{"op":"join","d":{"room":"ABC123"}}"#)
        .await
        .unwrap();
    assert!(wait_for_member_count(&state.coordinator, "ABC123", 2, SIGNAL_TIMEOUT_MS).await);

    // Dropping the gateway entry ends x's writer while its reader is still open.
    state.gateway.release(&x.connection_id);
    assert!(!state.gateway.is_connected(&x.connection_id));

    // Frames racing the shutdown must not outlive the disconnect.
    for _ in 0..20 {
        if x
            .send_text(r#"{"op":"join","d":{"room":"late"}}"#)
            .await
            .is_err()
        {
            break;
        }
    }

    assert!(wait_for_member_count(&state.coordinator, "ABC123", 1, SIGNAL_TIMEOUT_MS).await);
    assert!(wait_for_member_count(&state.coordinator, "late", 0, SIGNAL_TIMEOUT_MS).await);

    let start = Instant::now();
    loop {
        let stats = state.coordinator.stats().await.expect("coordinator running");
        if stats.connections == 1 {
            break;
        }
        assert!(
            start.elapsed() < Duration::from_millis(SIGNAL_TIMEOUT_MS),
            "x was never disconnected: {:?}",
            stats
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Nothing re-registers x once the disconnect has been applied.
    tokio::time::sleep(Duration::from_millis(100)).await;
    settle(&state.coordinator).await;
    let stats = state.coordinator.stats().await.expect("coordinator running");
    assert_eq!(stats.connections, 1);
    assert_eq!(stats.rooms, 1);
    assert!(wait_for_member_count(&state.coordinator, "late", 0, SIGNAL_TIMEOUT_MS).await);

    // The socket itself is closed.
    assert!(x.stays_silent(SIGNAL_TIMEOUT_MS).await);
    assert!(state.gateway.is_connected(&y.connection_id));

    y.close().await.unwrap();
}

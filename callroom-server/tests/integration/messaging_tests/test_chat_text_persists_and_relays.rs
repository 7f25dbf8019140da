use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{SIGNAL_TIMEOUT_MS, connect, join, send_frame, settle};

#[tokio::test]
async fn test_chat_text_persists_and_relays() {
    init_tracing();

    let (coordinator, output, history) = create_test_coordinator();
    let u1 = connect(&coordinator).await;
    let u2 = connect(&coordinator).await;
    join(&coordinator, &u1, "u1--u2").await;
    join(&coordinator, &u2, "u1--u2").await;

    send_frame(
        &coordinator,
        &u1,
        r#"{"op":"chat_text","d":{"room":"u1--u2","text":"hi","sender":"u1","receiver":"u2","timestamp":1700000000000}}"#,
    )
    .await;
    // No timestamp: the server stamps it.
    send_frame(
        &coordinator,
        &u2,
        r#"{"op":"chat_text","d":{"room":"u1--u2","text":"hey","sender":"u2","receiver":"u1"}}"#,
    )
    .await;
    settle(&coordinator).await;

    let to_u2 = output.received_by(&u2).await;
    assert_eq!(to_u2.len(), 1);
    assert_eq!(to_u2[0]["op"], "chat_text");
    assert_eq!(to_u2[0]["d"]["text"], "hi");
    assert_eq!(to_u2[0]["d"]["timestamp"], 1700000000000u64);

    let to_u1 = output.received_by(&u1).await;
    assert_eq!(to_u1.len(), 1);
    assert_eq!(to_u1[0]["d"]["text"], "hey");
    assert!(to_u1[0]["d"]["timestamp"].as_u64().unwrap() > 1700000000000);

    assert!(history.wait_for_attempts(2, SIGNAL_TIMEOUT_MS).await);
    let mut stored: Vec<String> = history.stored().await.into_iter().map(|m| m.text).collect();
    stored.sort();
    assert_eq!(stored, vec!["hey", "hi"]);
}

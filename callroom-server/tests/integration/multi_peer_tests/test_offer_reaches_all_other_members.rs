use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{connect, join, send_frame, settle};

#[tokio::test]
async fn test_offer_reaches_all_other_members() {
    init_tracing();

    let (coordinator, output, _history) = create_test_coordinator();
    let a = connect(&coordinator).await;
    let b = connect(&coordinator).await;
    let c = connect(&coordinator).await;
    let outsider = connect(&coordinator).await;

    for id in [&a, &b, &c] {
        join(&coordinator, id, "mesh").await;
    }
    join(&coordinator, &outsider, "elsewhere").await;

    send_frame(
        &coordinator,
        &a,
        r#"{"op":"offer","d":{"room":"mesh","sdp":{"type":"offer","sdp":"v=0"}}}"#,
    )
    .await;
    settle(&coordinator).await;

    for id in [&b, &c] {
        let received = output.received_by(id).await;
        assert_eq!(received.len(), 1, "each other member gets exactly one offer");
        assert_eq!(received[0]["d"]["sdp"]["type"], "offer");
    }
    assert!(output.received_by(&a).await.is_empty());
    assert!(output.received_by(&outsider).await.is_empty());
    assert_eq!(output.total().await, 2);
}

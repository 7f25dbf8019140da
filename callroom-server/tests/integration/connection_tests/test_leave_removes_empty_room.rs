use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{connect, join, leave, members};

#[tokio::test]
async fn test_leave_removes_empty_room() {
    init_tracing();

    let (coordinator, _output, _history) = create_test_coordinator();
    let c = connect(&coordinator).await;
    let stranger = connect(&coordinator).await;

    join(&coordinator, &c, "R").await;
    assert_eq!(members(&coordinator, "R").await, Some(vec![c.clone()]));

    // Leaving a room one never joined changes nothing.
    leave(&coordinator, &stranger, "R").await;
    assert_eq!(members(&coordinator, "R").await, Some(vec![c.clone()]));

    leave(&coordinator, &c, "R").await;
    assert!(!coordinator.room_exists(&"R".into()).await.unwrap());
    assert_eq!(coordinator.stats().await.unwrap().rooms, 0);

    // A second leave is a no-op, not an error.
    leave(&coordinator, &c, "R").await;
    assert_eq!(members(&coordinator, "R").await, None);
}

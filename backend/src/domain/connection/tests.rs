//! Tests for the connection lifecycle manager.

use std::time::Duration;

use super::*;
use crate::domain::ports::{FixtureDatabaseDriver, MockDatabaseDriver};
use rstest::{fixture, rstest};
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

#[fixture]
fn driver() -> Arc<FixtureDatabaseDriver> {
    Arc::new(FixtureDatabaseDriver::new())
}

fn manager_for(driver: Arc<dyn DatabaseDriver>) -> ConnectionManager {
    ConnectionManager::new(driver, ConnectOptions::new("postgres://localhost/test"))
}

async fn wait_until<F>(manager: &ConnectionManager, predicate: F)
where
    F: FnMut(&ConnectionState) -> bool,
{
    let mut receiver = manager.subscribe();
    timeout(WAIT, receiver.wait_for(predicate))
        .await
        .expect("state change within timeout")
        .expect("state channel open");
}

#[rstest]
#[tokio::test]
async fn status_is_false_before_connect(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver);
    assert!(!manager.connection_status());
    assert_eq!(manager.snapshot(), ConnectionState::default());
}

#[rstest]
#[tokio::test]
async fn connect_marks_connected(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());

    manager.connect().await.expect("connect succeeds");

    assert!(manager.connection_status());
    assert_eq!(manager.snapshot().phase, ConnectionPhase::Connected);
}

#[rstest]
#[tokio::test]
async fn second_connect_is_a_no_op(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());

    manager.connect().await.expect("first connect succeeds");
    manager.connect().await.expect("second connect succeeds");

    assert_eq!(driver.connect_calls(), 1);
}

#[rstest]
#[tokio::test]
async fn clones_share_state(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    let handle = manager.clone();

    manager.connect().await.expect("connect succeeds");
    handle.connect().await.expect("connect through clone succeeds");

    assert!(handle.connection_status());
    assert_eq!(driver.connect_calls(), 1);
}

#[rstest]
#[tokio::test]
async fn disconnect_clears_status(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    manager.connect().await.expect("connect succeeds");

    manager.disconnect().await;

    assert!(!manager.connection_status());
    assert_eq!(manager.snapshot().phase, ConnectionPhase::Disconnected);
    assert_eq!(driver.disconnect_calls(), 1);
}

#[rstest]
#[tokio::test]
async fn disconnect_without_connection_is_a_no_op(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());

    manager.disconnect().await;

    assert_eq!(driver.disconnect_calls(), 0);
}

#[rstest]
#[tokio::test]
async fn disconnected_notification_clears_status(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    manager.connect().await.expect("connect succeeds");

    assert!(driver.notify(DriverEvent::Disconnected));
    wait_until(&manager, |state| !state.is_connected).await;

    assert!(!manager.connection_status());
}

#[rstest]
#[tokio::test]
async fn reconnected_notification_restores_status(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    manager.connect().await.expect("connect succeeds");

    driver.notify(DriverEvent::Disconnected);
    wait_until(&manager, |state| !state.is_connected).await;
    driver.notify(DriverEvent::Reconnected);
    wait_until(&manager, |state| state.is_connected).await;

    assert!(manager.connection_status());
}

#[rstest]
#[tokio::test]
async fn error_notification_keeps_flag(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    manager.connect().await.expect("connect succeeds");

    driver.notify(DriverEvent::Error("replica lag".to_owned()));
    wait_until(&manager, |state| state.phase == ConnectionPhase::Errored).await;

    let snapshot = manager.snapshot();
    assert!(snapshot.is_connected);
    assert_eq!(snapshot.last_error.as_deref(), Some("replica lag"));
}

#[rstest]
#[tokio::test]
async fn stale_flag_is_caught_by_driver_readiness(driver: Arc<FixtureDatabaseDriver>) {
    let manager = manager_for(driver.clone());
    manager.connect().await.expect("connect succeeds");

    driver.set_ready(false);

    assert!(manager.snapshot().is_connected);
    assert!(!manager.connection_status());
}

#[rstest]
#[tokio::test]
async fn failed_connect_reports_error() {
    let driver = Arc::new(FixtureDatabaseDriver::failing("connection refused"));
    let manager = manager_for(driver);

    let err = manager.connect().await.expect_err("connect fails");

    assert!(err.to_string().contains("connection refused"));
    let snapshot = manager.snapshot();
    assert!(!snapshot.is_connected);
    assert_eq!(snapshot.phase, ConnectionPhase::Errored);
}

#[rstest]
#[tokio::test]
async fn failed_disconnect_leaves_state_untouched() {
    let mut driver = MockDatabaseDriver::new();
    driver.expect_connect().times(1).returning(|_| {
        let (_sender, receiver) = mpsc::unbounded_channel();
        Ok(receiver)
    });
    driver
        .expect_disconnect()
        .times(1)
        .returning(|| Err(DatabaseDriverError::disconnect("socket busy")));
    driver.expect_database_name().returning(|| None);
    driver.expect_is_ready().returning(|| true);
    let manager = manager_for(Arc::new(driver));
    manager.connect().await.expect("connect succeeds");

    manager.disconnect().await;

    assert!(manager.connection_status());
}

//! Unit tests for `NotificationCenter`
//!
//! Tests the display and exit windows and broadcast fan-out

use std::time::Duration;

use jobsync_client::NotificationCenter;
use jobsync_client::notify::Phase;
use jobsync_client::Severity;
use tokio::time::{Instant, advance};

fn center() -> NotificationCenter {
    NotificationCenter::new(Duration::from_secs(5), Duration::from_millis(300))
}

#[tokio::test(start_paused = true)]
async fn test_message_lifecycle() {
    let mut center = center();
    center.success("Session created successfully!");

    let phases: Vec<_> = center.visible(Instant::now()).map(|(_, p)| p).collect();
    assert_eq!(phases, vec![Phase::Visible]);

    advance(Duration::from_millis(5_100)).await;
    let phases: Vec<_> = center.visible(Instant::now()).map(|(_, p)| p).collect();
    assert_eq!(phases, vec![Phase::Exiting]);
    assert_eq!(center.retire_expired(Instant::now()), 0);

    advance(Duration::from_millis(300)).await;
    assert_eq!(center.visible(Instant::now()).count(), 0);
    assert_eq!(center.retire_expired(Instant::now()), 1);
    assert!(center.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_schedules_are_independent() {
    let mut center = center();
    center.info("first");
    advance(Duration::from_secs(3)).await;
    center.error("second");
    advance(Duration::from_millis(2_100)).await;

    let now = Instant::now();
    let seen: Vec<_> = center
        .visible(now)
        .map(|(message, phase)| (message.text.as_str(), phase))
        .collect();
    assert_eq!(seen, vec![("first", Phase::Exiting), ("second", Phase::Visible)]);

    advance(Duration::from_secs(1)).await;
    assert_eq!(center.retire_expired(Instant::now()), 1);
    assert_eq!(center.latest().unwrap().text, "second");
    assert_eq!(center.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_messages_retire_without_sweep() {
    let mut center = center();
    center.error("Disconnected from server!");
    center.info("Reconnecting...");
    assert_eq!(center.len(), 2);

    advance(Duration::from_secs(60)).await;
    assert_eq!(center.len(), 0);
    assert!(center.is_empty());
    assert!(center.latest().is_none());
    assert_eq!(center.iter().count(), 0);

    // Expired entries are dropped when the next message arrives
    center.success("Connected to server!");
    assert_eq!(center.len(), 1);
    assert_eq!(center.latest().unwrap().text, "Connected to server!");
    assert_eq!(center.retire_expired(Instant::now()), 0);
}

#[tokio::test]
async fn test_subscribers_receive_messages() {
    let mut center = center();
    let mut rx = center.subscribe();

    center.error("Disconnected from server!");
    center.info("Uploading combo file...");

    let first = rx.recv().await.unwrap();
    assert_eq!(first.text, "Disconnected from server!");
    assert_eq!(first.severity, Severity::Error);
    assert_eq!(rx.recv().await.unwrap().severity, Severity::Info);
}

#[test]
fn test_push_without_subscribers() {
    let mut center = NotificationCenter::default();
    center.push(Severity::Success, "ok");
    assert_eq!(center.iter().count(), 1);
}

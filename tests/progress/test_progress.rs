//! Unit tests for `ProgressSynchronizer`
//!
//! Tests wholesale replacement, reset and the watch subscription

use jobsync_client::{JobStatus, ProgressSynchronizer, StatusIndicator};
use serde_json::json;

fn snapshot(status: &str, checked: u64) -> JobStatus {
    JobStatus {
        status: status.to_string(),
        total_lines: 1_000,
        checked,
        ..JobStatus::default()
    }
}

#[test]
fn test_starts_zeroed() {
    let progress = ProgressSynchronizer::new();
    assert!(progress.current().is_zeroed());
    assert_eq!(progress.indicator(), StatusIndicator::Halted);
    assert_eq!(progress.view().elapsed.as_str(), "0:00:00");
}

#[test]
fn test_last_write_wins() {
    let mut progress = ProgressSynchronizer::new();
    progress.apply(snapshot("🔄 RUNNING", 500));
    // An older-looking snapshot still replaces the newer one
    progress.apply(snapshot("🔄 RUNNING", 20));
    assert_eq!(progress.current().checked, 20);
}

#[test]
fn test_snapshot_replaces_buckets() {
    let mut progress = ProgressSynchronizer::new();
    let first: JobStatus =
        serde_json::from_value(json!({"status": "RUNNING", "tier_a": 3, "tier_b": 1})).unwrap();
    let second: JobStatus =
        serde_json::from_value(json!({"status": "RUNNING", "tier_b": 2})).unwrap();

    progress.apply(first);
    progress.apply(second);

    assert_eq!(progress.view().buckets, vec![("tier_b".to_string(), 2)]);
}

#[test]
fn test_reset_after_activity() {
    let mut progress = ProgressSynchronizer::new();
    let mut paused = snapshot("⏸️ PAUSED", 300);
    paused.subtotals.insert("total_mega_fan".to_string(), json!(7));
    paused.subtotals.insert("total_fan_member".to_string(), json!(2));
    progress.apply(paused);
    assert_eq!(progress.indicator(), StatusIndicator::Attention);

    progress.reset();
    assert!(progress.current().is_zeroed());
    assert_eq!(progress.current().status, "STOPPED");
    assert_eq!(
        progress.view().buckets,
        vec![
            ("total_fan_member".to_string(), 0),
            ("total_mega_fan".to_string(), 0),
        ]
    );
}

#[test]
fn test_total_lines_only() {
    let mut progress = ProgressSynchronizer::new();
    progress.apply(snapshot("🔄 RUNNING", 40));
    progress.set_total_lines(12_000);

    let current = progress.current();
    assert_eq!(current.total_lines, 12_000);
    assert_eq!(current.checked, 40);
    assert_eq!(current.status, "🔄 RUNNING");
}

#[tokio::test]
async fn test_subscriber_sees_latest_view() {
    let mut progress = ProgressSynchronizer::new();
    let mut rx = progress.subscribe();

    progress.apply(snapshot("🔄 RUNNING", 1));
    progress.apply(snapshot("✅ COMPLETED", 1_000));

    rx.changed().await.unwrap();
    let view = rx.borrow_and_update().clone();
    assert_eq!(view.checked, 1_000);
    assert_eq!(view.indicator, StatusIndicator::Nominal);
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn test_indicator_for_decorated_text() {
    assert_eq!(
        StatusIndicator::classify("🔄 RUNNING"),
        StatusIndicator::Nominal
    );
    assert_eq!(
        StatusIndicator::classify("⏸️ PAUSED"),
        StatusIndicator::Attention
    );
    assert_eq!(
        StatusIndicator::classify("✅ COMPLETED"),
        StatusIndicator::Nominal
    );
    assert_eq!(
        StatusIndicator::classify("❌ ERROR"),
        StatusIndicator::Halted
    );
}

//! Unit tests for inbound event parsing
//!
//! Tests the parsing of named channel events into typed `ServerEvent`s

use jobsync_client::protocol::{ServerEvent, parse_event};
use jobsync_client::{ClientError, ProxyKind};
use serde_json::json;

#[test]
fn test_parse_session_created() {
    let event = parse_event("session_created", Some(json!({"session_id": "abc"}))).unwrap();
    match event {
        ServerEvent::SessionCreated { session_id } => assert_eq!(session_id.as_str(), "abc"),
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_session_reconnected_with_state() {
    let data = json!({
        "session_id": "abc",
        "previous_state": {
            "stats": {
                "status": "⏸️ PAUSED",
                "total_lines": 12000,
                "checked": 300,
                "invalid": 4,
                "hits": 2,
                "custom": 1,
                "errors": 0,
                "retries": 7,
                "cpm": 120,
                "elapsed_time": "0:02:30",
                "tier_a": 1
            },
            "combo_file_uploaded": true,
            "proxy_file_uploaded": false,
            "threads": 25,
            "proxy_type": "socks4",
            "checker_status": "paused"
        }
    });

    match parse_event("session_reconnected", Some(data)).unwrap() {
        ServerEvent::SessionReconnected {
            session_id,
            previous_state: Some(previous),
        } => {
            assert_eq!(session_id.as_str(), "abc");
            assert_eq!(previous.stats.total_lines, 12000);
            assert_eq!(previous.stats.retries, 7);
            assert!(previous.combo_file_uploaded);
            assert!(!previous.proxy_file_uploaded);
            assert_eq!(previous.threads, Some(25));
            assert_eq!(previous.proxy_type, Some(ProxyKind::Socks4));
            assert_eq!(previous.checker_status.as_deref(), Some("paused"));
            assert_eq!(previous.stats.buckets().collect::<Vec<_>>(), vec![("tier_a", 1)]);
        }
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_session_reconnected_without_state() {
    match parse_event("session_reconnected", Some(json!({"session_id": "abc"}))).unwrap() {
        ServerEvent::SessionReconnected { previous_state, .. } => assert!(previous_state.is_none()),
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_stats_update_tolerates_missing_fields() {
    match parse_event("stats_update", Some(json!({"status": "🔄 RUNNING", "checked": 9}))).unwrap() {
        ServerEvent::StatsUpdate(stats) => {
            assert_eq!(stats.status, "🔄 RUNNING");
            assert_eq!(stats.checked, 9);
            assert_eq!(stats.hits, 0);
            assert_eq!(stats.elapsed_time.as_str(), "0:00:00");
        }
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_proxy_uploaded_kind_fallbacks() {
    let both = json!({"count": 400, "message": "ok", "proxy_type": "socks5", "type": "http"});
    match parse_event("proxy_uploaded", Some(both)).unwrap() {
        ServerEvent::ProxyUploaded(confirmation) => {
            assert_eq!(confirmation.count, 400);
            assert_eq!(confirmation.confirmed_kind(), Some(ProxyKind::Socks5));
        }
        _ => panic!("Wrong event type"),
    }

    let legacy = json!({"count": 3, "message": "ok", "type": "socks4"});
    match parse_event("proxy_uploaded", Some(legacy)).unwrap() {
        ServerEvent::ProxyUploaded(confirmation) => {
            assert_eq!(confirmation.confirmed_kind(), Some(ProxyKind::Socks4));
        }
        _ => panic!("Wrong event type"),
    }

    let unknown = json!({"count": 3, "message": "ok", "proxy_type": "https"});
    match parse_event("proxy_uploaded", Some(unknown)).unwrap() {
        ServerEvent::ProxyUploaded(confirmation) => {
            assert_eq!(confirmation.confirmed_kind(), Some(ProxyKind::Http));
        }
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_checker_messages() {
    let event = parse_event("checker_paused", Some(json!({"message": "⏸️ PAUSED"}))).unwrap();
    assert_eq!(
        event,
        ServerEvent::CheckerPaused {
            message: "⏸️ PAUSED".to_string()
        }
    );
    assert_eq!(event.name(), "checker_paused");
}

#[test]
fn test_parse_results_payload() {
    let data = json!({"content": "a:b\n", "filename": "hits_abc_20240101_000000.txt"});
    match parse_event("hits_download", Some(data)).unwrap() {
        ServerEvent::HitsDownload(payload) => {
            assert_eq!(payload.content, "a:b\n");
            assert_eq!(payload.filename, "hits_abc_20240101_000000.txt");
        }
        _ => panic!("Wrong event type"),
    }
}

#[test]
fn test_parse_unknown_event() {
    let event = parse_event("server_restarting", Some(json!({"eta": 5}))).unwrap();
    match &event {
        ServerEvent::Unknown { name, data } => {
            assert_eq!(name, "server_restarting");
            assert_eq!(data.as_ref().unwrap()["eta"], 5);
        }
        _ => panic!("Wrong event type"),
    }
    assert_eq!(event.name(), "server_restarting");
}

#[test]
fn test_parse_malformed_payload() {
    let result = parse_event("session_created", Some(json!({"id": "abc"})));
    assert!(matches!(result, Err(ClientError::EventParse { .. })));

    let result = parse_event("combo_uploaded", Some(json!({"count": "many"})));
    assert!(result.is_err());
}

//! Unit tests for `SessionChannel`
//!
//! Tests the handshake choice and how backend events mutate session state

use std::sync::Arc;

use jobsync_client::protocol::{PreviousState, ResultsPayload, UploadConfirmation};
use jobsync_client::upload::InputContent;
use jobsync_client::{
    ClientOptions, ConnectionState, JobStatus, MemoryStorage, OutboundCommand, ProxyKind,
    ServerEvent, SessionChannel, SessionContext, SessionId, SessionStore, Severity, UploadCategory,
};

fn channel_with(storage: Arc<MemoryStorage>, page_url: &str) -> SessionChannel {
    let options = ClientOptions::builder().page_url(page_url).build();
    let ctx = SessionContext::new(options.page_location().unwrap(), &options);
    SessionChannel::new(ctx, SessionStore::new(storage))
}

fn fresh_channel() -> (SessionChannel, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (channel_with(Arc::clone(&storage), "http://host/crun"), storage)
}

fn last_notification(channel: &SessionChannel) -> (String, Severity) {
    let message = channel.context().notifications().latest().unwrap();
    (message.text.clone(), message.severity)
}

fn busy_stats() -> JobStatus {
    JobStatus {
        status: "🔄 RUNNING".to_string(),
        total_lines: 100,
        checked: 40,
        hits: 3,
        cpm: 600,
        ..JobStatus::default()
    }
}

#[test]
fn test_first_connect_requests_session() {
    let (mut channel, _) = fresh_channel();
    assert_eq!(channel.on_connected(), OutboundCommand::RequestSession);
    assert_eq!(channel.context().connection(), ConnectionState::Connected);
    assert_eq!(
        last_notification(&channel),
        (
            "Connected to server successfully!".to_string(),
            Severity::Success
        )
    );
}

#[test]
fn test_stored_id_is_restored() {
    let storage = Arc::new(MemoryStorage::with_session(SessionId::new("stored")));
    let mut channel = channel_with(storage, "http://host/crun");
    assert_eq!(
        channel.on_connected(),
        OutboundCommand::ReconnectSession {
            session_id: SessionId::new("stored")
        }
    );
}

#[test]
fn test_location_id_beats_stored_id() {
    let storage = Arc::new(MemoryStorage::with_session(SessionId::new("stored")));
    let mut channel = channel_with(Arc::clone(&storage), "http://host/crun?session=shared");
    assert_eq!(
        channel.on_connected(),
        OutboundCommand::ReconnectSession {
            session_id: SessionId::new("shared")
        }
    );
    assert_eq!(storage.current(), Some(SessionId::new("shared")));
}

#[test]
fn test_session_created_resets_everything() {
    let (mut channel, storage) = fresh_channel();
    channel.on_connected();

    let mut stats = busy_stats();
    stats
        .subtotals
        .insert("total_mega_fan".to_string(), serde_json::json!(5));
    channel.handle_event(ServerEvent::StatsUpdate(stats));
    channel.handle_event(ServerEvent::ComboUploaded(UploadConfirmation::new(100, "done")));
    channel
        .context_mut()
        .input_mut(UploadCategory::Proxy)
        .paste("1.1.1.1:80")
        .unwrap();

    let delivery = channel.handle_event(ServerEvent::SessionCreated {
        session_id: SessionId::new("fresh"),
    });
    assert!(delivery.is_none());

    let ctx = channel.context();
    assert_eq!(ctx.session_id(), Some(&SessionId::new("fresh")));
    assert!(ctx.progress().current().is_zeroed());
    assert_eq!(ctx.progress().current().status, "STOPPED");
    assert_eq!(
        ctx.progress().view().buckets,
        vec![("total_mega_fan".to_string(), 0)]
    );
    assert!(!ctx.uploads().get(UploadCategory::Combo).uploaded);
    assert_eq!(ctx.input(UploadCategory::Combo).content(), &InputContent::Empty);
    assert_eq!(ctx.input(UploadCategory::Proxy).content(), &InputContent::Empty);
    assert_eq!(ctx.location().url().as_str(), "http://host/crun?session=fresh");
    assert_eq!(storage.current(), Some(SessionId::new("fresh")));
    assert_eq!(
        last_notification(&channel).0,
        "Session created successfully!"
    );
}

#[test]
fn test_session_reconnected_hydrates() {
    let (mut channel, _) = fresh_channel();
    channel.on_connected();

    let previous = PreviousState {
        stats: JobStatus {
            status: "⏸️ PAUSED".to_string(),
            total_lines: 12_000,
            checked: 5_000,
            ..JobStatus::default()
        },
        combo_file_uploaded: true,
        proxy_file_uploaded: true,
        threads: Some(40),
        proxy_type: Some(ProxyKind::Socks5),
        checker_status: Some("paused".to_string()),
    };

    channel.handle_event(ServerEvent::SessionReconnected {
        session_id: SessionId::new("back"),
        previous_state: Some(previous),
    });

    let ctx = channel.context();
    assert_eq!(ctx.session_id(), Some(&SessionId::new("back")));
    assert_eq!(ctx.progress().current().checked, 5_000);
    assert_eq!(ctx.threads(), 40);
    assert_eq!(ctx.proxy_kind(), ProxyKind::Socks5);

    let combo = ctx.uploads().get(UploadCategory::Combo);
    assert!(combo.uploaded);
    assert_eq!(combo.line_count, Some(12_000));
    let proxy = ctx.uploads().get(UploadCategory::Proxy);
    assert!(proxy.uploaded);
    assert_eq!(proxy.line_count, None);

    assert_eq!(
        ctx.input(UploadCategory::Combo).display(),
        "Combo file uploaded (12000 lines). Ready to check."
    );
    assert_eq!(
        ctx.input(UploadCategory::Proxy).display(),
        "Proxy file uploaded. Ready to check."
    );
    assert_eq!(ctx.location().url().as_str(), "http://host/crun?session=back");
    assert_eq!(
        last_notification(&channel).0,
        "Session reconnected successfully!"
    );
}

#[test]
fn test_reconnect_defaults_when_fields_missing() {
    let (mut channel, _) = fresh_channel();
    channel.on_connected();
    channel.context_mut().set_proxy_kind(ProxyKind::Socks4);

    channel.handle_event(ServerEvent::SessionReconnected {
        session_id: SessionId::new("back"),
        previous_state: Some(PreviousState {
            stats: JobStatus::default(),
            combo_file_uploaded: false,
            proxy_file_uploaded: false,
            threads: None,
            proxy_type: None,
            checker_status: None,
        }),
    });

    let ctx = channel.context();
    assert_eq!(ctx.threads(), 10);
    assert_eq!(ctx.proxy_kind(), ProxyKind::Http);
    assert_eq!(ctx.input(UploadCategory::Combo).display(), "");
}

#[test]
fn test_reconnect_ignores_out_of_range_threads() {
    for stored in [0, 500] {
        let (mut channel, _) = fresh_channel();
        channel.on_connected();

        channel.handle_event(ServerEvent::SessionReconnected {
            session_id: SessionId::new("back"),
            previous_state: Some(PreviousState {
                stats: JobStatus::default(),
                combo_file_uploaded: false,
                proxy_file_uploaded: false,
                threads: Some(stored),
                proxy_type: None,
                checker_status: None,
            }),
        });

        assert_eq!(channel.context().threads(), 10, "stored {stored}");
    }
}

#[test]
fn test_combo_uploaded_sets_total_lines() {
    let (mut channel, _) = fresh_channel();
    channel.handle_event(ServerEvent::ComboUploaded(UploadConfirmation::new(
        12_000,
        "✅ DONE! 12000 valid lines found for combo.",
    )));

    let ctx = channel.context();
    assert_eq!(ctx.progress().current().total_lines, 12_000);
    assert_eq!(ctx.progress().view().total_lines, 12_000);
    assert_eq!(
        ctx.uploads().get(UploadCategory::Combo).line_count,
        Some(12_000)
    );
    assert_eq!(
        last_notification(&channel),
        (
            "✅ DONE! 12000 valid lines found for combo.".to_string(),
            Severity::Success
        )
    );
}

#[test]
fn test_proxy_uploaded_adopts_confirmed_kind() {
    let (mut channel, _) = fresh_channel();
    channel.context_mut().set_proxy_kind(ProxyKind::Http);

    channel.handle_event(ServerEvent::ProxyUploaded(
        UploadConfirmation::new(400, "done").with_proxy_type(ProxyKind::Socks4),
    ));

    let ctx = channel.context();
    assert_eq!(ctx.proxy_kind(), ProxyKind::Socks4);
    let proxy = ctx.uploads().get(UploadCategory::Proxy);
    assert_eq!(proxy.auxiliary_kind, Some(ProxyKind::Socks4));
    assert_eq!(proxy.line_count, Some(400));
    assert_eq!(ctx.progress().current().total_lines, 0);
}

#[test]
fn test_reupload_replaces_artifact() {
    let (mut channel, _) = fresh_channel();
    channel.handle_event(ServerEvent::ComboUploaded(UploadConfirmation::new(10, "a")));
    channel.handle_event(ServerEvent::ComboUploaded(UploadConfirmation::new(7, "b")));
    assert_eq!(
        channel
            .context()
            .uploads()
            .get(UploadCategory::Combo)
            .line_count,
        Some(7)
    );
}

#[test]
fn test_checker_notifications() {
    let (mut channel, _) = fresh_channel();

    channel.handle_event(ServerEvent::CheckerStarted {
        message: "started".to_string(),
    });
    assert_eq!(last_notification(&channel).1, Severity::Success);

    channel.handle_event(ServerEvent::CheckerPaused {
        message: "paused".to_string(),
    });
    assert_eq!(last_notification(&channel), ("paused".to_string(), Severity::Info));

    channel.handle_event(ServerEvent::CheckerStopped {
        message: "stopped".to_string(),
    });
    assert_eq!(last_notification(&channel).1, Severity::Info);

    channel.handle_event(ServerEvent::CheckerCompleted {
        message: "done".to_string(),
    });
    assert_eq!(last_notification(&channel).1, Severity::Success);
}

#[test]
fn test_backend_error_mutates_nothing() {
    let (mut channel, _) = fresh_channel();
    channel.on_connected();
    channel.handle_event(ServerEvent::SessionCreated {
        session_id: SessionId::new("s"),
    });
    channel.handle_event(ServerEvent::StatsUpdate(busy_stats()));

    channel.handle_event(ServerEvent::Error {
        message: "❌ UPLOAD FAILED. Stop the checker first.".to_string(),
    });

    let ctx = channel.context();
    assert_eq!(ctx.session_id(), Some(&SessionId::new("s")));
    assert_eq!(ctx.progress().current(), &busy_stats());
    assert_eq!(
        last_notification(&channel),
        (
            "❌ UPLOAD FAILED. Stop the checker first.".to_string(),
            Severity::Error
        )
    );
}

#[test]
fn test_results_events_are_handed_back() {
    let (mut channel, _) = fresh_channel();
    let payload = ResultsPayload {
        content: "x".to_string(),
        filename: "hits.txt".to_string(),
    };

    let pushed = channel
        .handle_event(ServerEvent::HitsAvailable(payload.clone()))
        .unwrap();
    assert!(pushed.pushed);

    let requested = channel
        .handle_event(ServerEvent::HitsDownload(payload))
        .unwrap();
    assert!(!requested.pushed);
}

#[test]
fn test_disconnect_keeps_state() {
    let (mut channel, _) = fresh_channel();
    channel.on_connected();
    channel.handle_event(ServerEvent::SessionCreated {
        session_id: SessionId::new("s"),
    });
    channel.handle_event(ServerEvent::StatsUpdate(busy_stats()));

    channel.on_disconnected();

    let ctx = channel.context();
    assert_eq!(ctx.connection(), ConnectionState::Disconnected);
    assert_eq!(ctx.session_id(), Some(&SessionId::new("s")));
    assert_eq!(ctx.progress().current().checked, 40);
    assert_eq!(
        last_notification(&channel),
        ("Disconnected from server!".to_string(), Severity::Error)
    );

    // Reconnect presents the same id
    assert_eq!(
        channel.on_connected(),
        OutboundCommand::ReconnectSession {
            session_id: SessionId::new("s")
        }
    );
}

#[test]
fn test_unknown_event_is_ignored() {
    let (mut channel, _) = fresh_channel();
    let before = channel.context().notifications().len();
    let delivery = channel.handle_event(ServerEvent::Unknown {
        name: "mystery".to_string(),
        data: None,
    });
    assert!(delivery.is_none());
    assert_eq!(channel.context().notifications().len(), before);
}

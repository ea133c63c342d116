//! Unit tests for `CommandDispatcher` and results delivery
//!
//! Tests the session gate, thread-count validation and saving results

use std::sync::Arc;

use jobsync_client::protocol::ResultsPayload;
use jobsync_client::{
    ClientError, ClientOptions, CommandDispatcher, FsResultsSink, MemoryStorage, OutboundCommand,
    ResultsDelivery, ResultsSink, ServerEvent, SessionChannel, SessionContext, SessionId,
    SessionStore, Severity,
};
use tokio_test::assert_ok;

fn channel() -> SessionChannel {
    let options = ClientOptions::default();
    let ctx = SessionContext::new(options.page_location().unwrap(), &options);
    SessionChannel::new(ctx, SessionStore::new(Arc::new(MemoryStorage::new())))
}

fn ready_channel() -> SessionChannel {
    let mut channel = channel();
    channel.on_connected();
    channel.handle_event(ServerEvent::SessionCreated {
        session_id: SessionId::new("sess"),
    });
    channel
}

fn latest_error(channel: &SessionChannel) -> String {
    let message = channel.context().notifications().latest().unwrap();
    assert_eq!(message.severity, Severity::Error);
    message.text.clone()
}

fn dispatcher(dir: &std::path::Path) -> CommandDispatcher<FsResultsSink> {
    CommandDispatcher::new(FsResultsSink::new(dir))
}

#[test]
fn test_start_accepts_range() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = ready_channel();

    for (input, threads) in [("1", 1), ("100", 100), ("25", 25), ("12abc", 12)] {
        let command = dispatcher.start(channel.context_mut(), input).unwrap();
        assert_eq!(
            command,
            OutboundCommand::StartChecker {
                session_id: SessionId::new("sess"),
                threads,
            }
        );
        assert_eq!(channel.context().threads(), threads);
    }
}

#[test]
fn test_start_rejects_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = ready_channel();

    for input in ["0", "101", "-3", "abc", ""] {
        let err = dispatcher.start(channel.context_mut(), input).unwrap_err();
        assert!(
            matches!(err, ClientError::InvalidThreadCount(_)),
            "input {input:?}"
        );
        assert!(err.is_local_validation());
        assert_eq!(
            latest_error(&channel),
            "Please enter a valid thread count (1-100)!"
        );
    }
    assert_eq!(channel.context().threads(), 10);
}

#[test]
fn test_gate_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = channel();
    channel.on_connected();

    let err = dispatcher.stop(channel.context_mut()).unwrap_err();
    assert!(matches!(err, ClientError::NoSession));
    assert_eq!(
        latest_error(&channel),
        "No active session. Please refresh the page or wait for connection."
    );

    // Gate runs before thread validation
    let err = dispatcher.start(channel.context_mut(), "500").unwrap_err();
    assert!(matches!(err, ClientError::NoSession));
}

#[test]
fn test_gate_while_disconnected() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = ready_channel();
    channel.on_disconnected();

    let err = dispatcher.pause(channel.context_mut()).unwrap_err();
    assert!(matches!(err, ClientError::NotConnected));
    assert_eq!(
        latest_error(&channel),
        "Not connected to server. Please check your connection."
    );
}

#[test]
fn test_control_commands() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = ready_channel();
    let session_id = SessionId::new("sess");

    assert_eq!(
        dispatcher.stop(channel.context_mut()).unwrap(),
        OutboundCommand::StopChecker {
            session_id: session_id.clone()
        }
    );
    assert_eq!(
        dispatcher.pause(channel.context_mut()).unwrap(),
        OutboundCommand::PauseChecker {
            session_id: session_id.clone()
        }
    );
    assert_eq!(
        dispatcher.resume(channel.context_mut()).unwrap(),
        OutboundCommand::ContinueChecker {
            session_id: session_id.clone()
        }
    );
    assert_eq!(
        dispatcher.request_results(channel.context_mut()).unwrap(),
        OutboundCommand::DownloadHits { session_id }
    );
}

#[tokio::test]
async fn test_fs_sink_strips_directories() {
    let dir = tempfile::tempdir().unwrap();
    let sink = FsResultsSink::new(dir.path().join("downloads"));

    let path = assert_ok!(sink.save("../../escape.txt", "a:b\n").await);
    assert_eq!(path, dir.path().join("downloads").join("escape.txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "a:b\n");
}

#[tokio::test]
async fn test_deliver_pushed_and_requested() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = dispatcher(dir.path());
    let mut channel = ready_channel();
    let payload = ResultsPayload {
        content: "x:y\n".to_string(),
        filename: "hits_sess_20240101_000000.txt".to_string(),
    };

    let path = dispatcher
        .deliver_results(channel.context_mut(), ResultsDelivery::pushed(payload.clone()))
        .await
        .unwrap();
    assert!(path.ends_with("hits_sess_20240101_000000.txt"));
    let message = channel.context().notifications().latest().unwrap();
    assert_eq!(message.text, "Hits file is ready for download!");
    assert_eq!(message.severity, Severity::Success);

    dispatcher
        .deliver_results(channel.context_mut(), ResultsDelivery::requested(payload))
        .await
        .unwrap();
    assert_eq!(
        channel.context().notifications().latest().unwrap().text,
        "Hits downloaded successfully!"
    );
}

#[tokio::test]
async fn test_deliver_failure_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a directory").unwrap();

    let dispatcher = dispatcher(&blocker);
    let mut channel = ready_channel();
    let payload = ResultsPayload {
        content: String::new(),
        filename: "hits.txt".to_string(),
    };

    let result = dispatcher
        .deliver_results(channel.context_mut(), ResultsDelivery::pushed(payload))
        .await;
    assert!(matches!(result, Err(ClientError::Io(_))));
    assert!(latest_error(&channel).starts_with("Failed to save hits file:"));
}

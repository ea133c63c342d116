//! Unit tests for session id persistence
//!
//! Tests location precedence, durable storage and failure tolerance

use std::sync::Arc;

use jobsync_client::{FileStorage, MemoryStorage, PageLocation, SessionId, SessionStorage, SessionStore};
use url::Url;
use uuid::Uuid;

fn location(raw: &str) -> PageLocation {
    PageLocation::new(Url::parse(raw).unwrap())
}

#[test]
fn test_location_id_wins_and_is_persisted() {
    let storage = Arc::new(MemoryStorage::with_session(SessionId::new("stored")));
    let store = SessionStore::new(Arc::clone(&storage));

    let id = store.load(&location("http://host/crun?session=shared"));
    assert_eq!(id, Some(SessionId::new("shared")));
    assert_eq!(storage.current(), Some(SessionId::new("shared")));
}

#[test]
fn test_falls_back_to_stored_id() {
    let storage = MemoryStorage::with_session(SessionId::new("stored"));
    let store = SessionStore::new(storage);
    assert_eq!(
        store.load(&location("http://host/crun")),
        Some(SessionId::new("stored"))
    );
}

#[test]
fn test_nothing_stored() {
    let store = SessionStore::new(MemoryStorage::new());
    assert_eq!(store.load(&location("http://host/crun")), None);
}

#[test]
fn test_save_is_idempotent() {
    let storage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(Arc::clone(&storage));
    let id = SessionId::new("abc");
    store.save(&id);
    store.save(&id);
    assert_eq!(storage.current(), Some(id));
}

#[test]
fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().join("state");
    let id = SessionId::new(Uuid::new_v4().to_string());

    {
        let store = SessionStore::new(FileStorage::new(&state_dir));
        store.save(&id);
    }

    let store = SessionStore::new(FileStorage::new(&state_dir));
    assert_eq!(store.load(&location("http://host/crun")), Some(id.clone()));

    let raw = std::fs::read_to_string(state_dir.join("session.json")).unwrap();
    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["session_id"], id.as_str());
    assert!(record["saved_at"].is_string());
}

#[test]
fn test_file_storage_ignores_corrupt_record() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    std::fs::write(storage.path(), "{ not json").unwrap();
    assert_eq!(storage.load(), None);
}

#[test]
fn test_file_storage_unwritable_dir_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a directory").unwrap();

    let storage = FileStorage::new(blocker.join("nested"));
    storage.save(&SessionId::new("lost"));
    assert_eq!(storage.load(), None);
}

#[test]
fn test_location_rewrite() {
    let mut loc = location("http://host/crun");
    loc.set_session_id(&SessionId::new("abc"));
    assert_eq!(loc.url().as_str(), "http://host/crun?session=abc");

    loc.set_session_id(&SessionId::new("def"));
    assert_eq!(loc.url().as_str(), "http://host/crun?session=def");
    assert_eq!(loc.session_id(), Some(SessionId::new("def")));
}

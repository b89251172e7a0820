use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

use mathe_core::{UserId, UserRecord};

/// A stored document as the record store hands it over, not yet decoded.
pub type RawRecord = serde_json::Value;

/// Errors surfaced by record-store adapters.
///
/// A missing record is not an error; `read_once` reports it as `Ok(None)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),
}

/// Contract for the external record-storage collaborator.
///
/// Reads are one-shot: no caching, no subscription, no retry. A single failed
/// read is surfaced immediately.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the record at `path` once.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` when the read itself fails; a path
    /// with no record yields `Ok(None)`.
    async fn read_once(&self, path: &str) -> Result<Option<RawRecord>, StoreError>;
}

/// Storage path of a user's profile document.
#[must_use]
pub fn user_path(uid: &UserId) -> String {
    format!("/users/{uid}")
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// In-memory record store for tests and credential-free demo runs.
///
/// Counts reads and supports per-path failure injection, so tests can assert
/// both how many reads a load performs and the transport-failure path.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<String, RawRecord>>,
    failing: Mutex<HashSet<String>>,
    reads: AtomicUsize,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document at an explicit path.
    pub fn insert(&self, path: &str, record: RawRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.insert(path.to_string(), record);
        }
    }

    /// Store a user record under its canonical `/users/{uid}` path.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the record cannot be encoded.
    pub fn insert_user(&self, record: &UserRecord) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_value(record)?;
        self.insert(&user_path(&record.doc().id), raw);
        Ok(())
    }

    /// Make every subsequent read of `path` fail with a transport error.
    pub fn fail_path(&self, path: &str) {
        if let Ok(mut guard) = self.failing.lock() {
            guard.insert(path.to_string());
        }
    }

    /// Number of reads performed so far, failed ones included.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn read_once(&self, path: &str) -> Result<Option<RawRecord>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing
            .lock()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if failing.contains(path) {
            return Err(StoreError::Transport(format!(
                "injected failure for {path}"
            )));
        }
        drop(failing);

        let records = self
            .records
            .lock()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(records.get(path).cloned())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn read_once_returns_stored_record() {
        let store = InMemoryRecordStore::new();
        store.insert("/users/u1", json!({ "id": "u1" }));

        let record = store.read_once("/users/u1").await.unwrap();
        assert_eq!(record, Some(json!({ "id": "u1" })));
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn read_once_of_missing_path_is_none_not_error() {
        let store = InMemoryRecordStore::new();
        let record = store.read_once("/users/absent").await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn injected_failure_surfaces_as_transport_error() {
        let store = InMemoryRecordStore::new();
        store.insert("/users/u1", json!({ "id": "u1" }));
        store.fail_path("/users/u1");

        let err = store.read_once("/users/u1").await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
        assert_eq!(store.reads(), 1);
    }

    #[test]
    fn user_path_is_keyed_by_uid() {
        assert_eq!(user_path(&UserId::new("abc")), "/users/abc");
    }
}

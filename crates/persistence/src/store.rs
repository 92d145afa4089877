// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use civdraft::DraftState;
use civdraft_domain::SessionKey;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::debug;

use crate::data_models::{PurgeReport, SessionRecord};
use crate::error::PersistenceError;
use crate::locks::{KeyLockGuard, WriteLocks};
use crate::Persistence;

/// Current time in Unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let millis: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}

/// Shareable async front for [`Persistence`].
///
/// Reads go straight to the database. Writes and deletes are only possible
/// through a [`SessionWriter`], which holds the key's write lock for as long
/// as it lives.
#[derive(Clone)]
pub struct SessionStore {
    persistence: Arc<Mutex<Persistence>>,
    locks: WriteLocks,
}

impl SessionStore {
    /// Wraps a persistence adapter.
    #[must_use]
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            locks: WriteLocks::new(),
        }
    }

    /// Reads a session without taking its write lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub async fn read(&self, key: &SessionKey) -> Result<Option<SessionRecord>, PersistenceError> {
        self.persistence.lock().await.read_session(key)
    }

    /// Returns a session's version without decoding it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn version(&self, key: &SessionKey) -> Result<Option<i64>, PersistenceError> {
        self.persistence.lock().await.session_version(key)
    }

    /// Waits for exclusive write access to `key`.
    ///
    /// Writers for the same key are served in the order they called `lock`.
    pub async fn lock(&self, key: &SessionKey) -> SessionWriter {
        let guard: KeyLockGuard = self.locks.acquire(key).await;
        debug!(session_key = %key, "Acquired session write lock");
        SessionWriter {
            persistence: Arc::clone(&self.persistence),
            guard,
        }
    }

    /// Deletes sessions idle for longer than `retention`, and corrupt rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep cannot query or delete.
    pub async fn purge_expired(&self, retention: Duration) -> Result<PurgeReport, PersistenceError> {
        let retention_millis: i64 = i64::try_from(retention.as_millis()).unwrap_or(i64::MAX);
        let cutoff: i64 = now_millis().saturating_sub(retention_millis);
        self.persistence.lock().await.purge_expired(cutoff)
    }

    /// The lock table, for inspection.
    #[must_use]
    pub const fn write_locks(&self) -> &WriteLocks {
        &self.locks
    }
}

/// Exclusive read-modify-write access to one session.
///
/// Dropping the writer releases the key, whether or not the write succeeded.
pub struct SessionWriter {
    persistence: Arc<Mutex<Persistence>>,
    guard: KeyLockGuard,
}

impl SessionWriter {
    /// The locked key.
    #[must_use]
    pub const fn key(&self) -> &SessionKey {
        self.guard.key()
    }

    /// Reads the current record.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub async fn read(&self) -> Result<Option<SessionRecord>, PersistenceError> {
        self.persistence.lock().await.read_session(self.key())
    }

    /// Writes a new state and history, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed, too large, or cannot be
    /// written.
    pub async fn write(
        &self,
        state: &DraftState,
        history: &[DraftState],
    ) -> Result<i64, PersistenceError> {
        self.persistence
            .lock()
            .await
            .write_session(self.key(), state, history, now_millis())
    }

    /// Deletes the session, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self) -> Result<bool, PersistenceError> {
        self.persistence.lock().await.delete_session(self.key())
    }
}

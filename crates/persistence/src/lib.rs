// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned session store for the drafting tool.
//!
//! Each draft session is one row holding the current state, its undo
//! history, a version that increases by one on every accepted write, and
//! creation/update timestamps. Storage is `SQLite` through Diesel.
//!
//! ## Layers
//!
//! - [`Persistence`] owns the connection and performs single operations.
//! - [`SessionStore`] is the async, shareable front. It serializes writers
//!   per session key through [`WriteLocks`], so a read-modify-write done
//!   through a [`SessionWriter`] never interleaves with another for the
//!   same key.
//!
//! ## Testing Philosophy
//!
//! - Tests run against isolated in-memory databases
//! - Each `new_in_memory()` call gets its own shared-cache database

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use civdraft::DraftState;
use civdraft_domain::SessionKey;
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod locks;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{PurgeReport, SessionRecord};
pub use error::PersistenceError;
pub use locks::{KeyLockGuard, WriteLocks};
pub use store::{SessionStore, SessionWriter, now_millis};

use data_models::SessionRow;

/// Hard ceiling on the serialized size of one session's state plus history.
pub const MAX_PAYLOAD_BYTES: usize = 512 * 1024;

/// Persistence adapter for draft sessions.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so adapters never
    /// see each other's rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:civdraft_mem_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;

        Ok(Self { conn })
    }

    /// Reads a session.
    ///
    /// A missing key is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row cannot be decoded.
    pub fn read_session(
        &mut self,
        key: &SessionKey,
    ) -> Result<Option<SessionRecord>, PersistenceError> {
        queries::get_session_row(&mut self.conn, key.as_str())?
            .map(SessionRow::decode)
            .transpose()
    }

    /// Returns the current version of a session without decoding it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn session_version(&mut self, key: &SessionKey) -> Result<Option<i64>, PersistenceError> {
        queries::get_session_version(&mut self.conn, key.as_str())
    }

    /// Writes a session, bumping its version.
    ///
    /// Callers must hold the key's write lock; see [`SessionStore::lock`].
    ///
    /// # Arguments
    ///
    /// * `key` - The session key
    /// * `state` - The new current state
    /// * `history` - The new undo history, oldest first
    /// * `now_millis` - The write timestamp in Unix milliseconds
    ///
    /// # Returns
    ///
    /// The new version: 1 for a new key, otherwise the prior version plus one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state or a history entry fails its structural check
    /// - A history entry uses a different configuration than the state
    /// - The serialized record exceeds [`MAX_PAYLOAD_BYTES`]
    /// - The database write fails
    pub fn write_session(
        &mut self,
        key: &SessionKey,
        state: &DraftState,
        history: &[DraftState],
        now_millis: i64,
    ) -> Result<i64, PersistenceError> {
        check_record(state, history)?;

        let state_json: String = serde_json::to_string(state)?;
        let history_json: String = serde_json::to_string(history)?;
        let size: usize = state_json.len() + history_json.len();
        if size > MAX_PAYLOAD_BYTES {
            return Err(PersistenceError::PayloadTooLarge {
                size,
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        mutations::upsert_session(
            &mut self.conn,
            key.as_str(),
            &state_json,
            &history_json,
            now_millis,
        )
    }

    /// Deletes a session.
    ///
    /// # Returns
    ///
    /// Whether a session existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, key: &SessionKey) -> Result<bool, PersistenceError> {
        mutations::delete_session(&mut self.conn, key.as_str())
    }

    /// Deletes sessions not updated since `cutoff_millis`, and any row that
    /// fails to decode.
    ///
    /// A corrupt row never aborts the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried or written.
    pub fn purge_expired(&mut self, cutoff_millis: i64) -> Result<PurgeReport, PersistenceError> {
        let (expired, live): (Vec<String>, Vec<SessionRow>) =
            queries::list_purge_candidates(&mut self.conn, cutoff_millis)?;

        let corrupt: Vec<String> = live
            .into_iter()
            .filter_map(|row| {
                let session_key: String = row.session_key.clone();
                match row.decode() {
                    Ok(_) => None,
                    Err(err) => {
                        warn!(session_key = %session_key, error = %err, "Purging corrupt session");
                        Some(session_key)
                    }
                }
            })
            .collect();

        let expired_count: usize = mutations::delete_sessions(&mut self.conn, &expired)?;
        let corrupt_count: usize = mutations::delete_sessions(&mut self.conn, &corrupt)?;

        let report: PurgeReport = PurgeReport {
            expired: expired_count,
            corrupt: corrupt_count,
        };
        if report.total() > 0 {
            info!(
                expired = report.expired,
                corrupt = report.corrupt,
                "Purged sessions"
            );
        }
        Ok(report)
    }
}

/// Minimal structural check applied to every write.
fn check_record(state: &DraftState, history: &[DraftState]) -> Result<(), PersistenceError> {
    state.check_structure()?;
    for (index, entry) in history.iter().enumerate() {
        entry
            .check_structure()
            .map_err(|e| PersistenceError::InvalidRecord(format!("history[{index}]: {e}")))?;
        if entry.config != state.config {
            return Err(PersistenceError::InvalidRecord(format!(
                "history[{index}] uses a different draft configuration"
            )));
        }
    }
    Ok(())
}

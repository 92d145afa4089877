// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::data_models::NewSessionRow;
use crate::diesel_schema::draft_sessions;
use crate::error::PersistenceError;

/// Inserts or replaces a session, bumping its version.
///
/// Runs in a single transaction: the prior version and `created_at` are read
/// and the row is written with `version + 1`, or version 1 for a new key.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_key` - A validated session key
/// * `state_json` - The serialized state
/// * `history_json` - The serialized history
/// * `now_millis` - The write timestamp in Unix milliseconds
///
/// # Returns
///
/// The new version.
///
/// # Errors
///
/// Returns an error if the transaction fails.
pub fn upsert_session(
    conn: &mut SqliteConnection,
    session_key: &str,
    state_json: &str,
    history_json: &str,
    now_millis: i64,
) -> Result<i64, PersistenceError> {
    conn.transaction::<i64, PersistenceError, _>(|tx| {
        let prior: Option<i64> = draft_sessions::table
            .find(session_key)
            .select(draft_sessions::version)
            .first::<i64>(tx)
            .optional()?;

        match prior {
            Some(version) => {
                let next_version: i64 = version + 1;
                diesel::update(draft_sessions::table.find(session_key))
                    .set((
                        draft_sessions::state_json.eq(state_json),
                        draft_sessions::history_json.eq(history_json),
                        draft_sessions::version.eq(next_version),
                        draft_sessions::updated_at.eq(now_millis),
                    ))
                    .execute(tx)?;
                debug!(session_key, version = next_version, "Updated session");
                Ok(next_version)
            }
            None => {
                diesel::insert_into(draft_sessions::table)
                    .values(NewSessionRow {
                        session_key,
                        state_json,
                        history_json,
                        version: 1,
                        created_at: now_millis,
                        updated_at: now_millis,
                    })
                    .execute(tx)?;
                info!(session_key, "Created session");
                Ok(1)
            }
        }
    })
}

/// Deletes a session.
///
/// # Returns
///
/// Whether a row was removed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_session(
    conn: &mut SqliteConnection,
    session_key: &str,
) -> Result<bool, PersistenceError> {
    let rows_affected: usize =
        diesel::delete(draft_sessions::table.find(session_key)).execute(conn)?;
    Ok(rows_affected > 0)
}

/// Deletes a batch of sessions.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_sessions(
    conn: &mut SqliteConnection,
    session_keys: &[String],
) -> Result<usize, PersistenceError> {
    if session_keys.is_empty() {
        return Ok(0);
    }
    let rows_affected: usize = diesel::delete(draft_sessions::table)
        .filter(draft_sessions::session_key.eq_any(session_keys))
        .execute(conn)?;
    Ok(rows_affected)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::data_models::SessionRow;
use crate::diesel_schema::draft_sessions;
use crate::error::PersistenceError;

/// Retrieves the raw row for a session key.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `session_key` - A validated session key
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_session_row(
    conn: &mut SqliteConnection,
    session_key: &str,
) -> Result<Option<SessionRow>, PersistenceError> {
    debug!(session_key, "Looking up session");

    draft_sessions::table
        .find(session_key)
        .select(SessionRow::as_select())
        .first(conn)
        .optional()
        .map_err(PersistenceError::from)
}

/// Retrieves only the version column for a session key.
///
/// This is the cheap path used by polling clients.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_session_version(
    conn: &mut SqliteConnection,
    session_key: &str,
) -> Result<Option<i64>, PersistenceError> {
    draft_sessions::table
        .find(session_key)
        .select(draft_sessions::version)
        .first::<i64>(conn)
        .optional()
        .map_err(PersistenceError::from)
}

/// Lists every row the retention sweep has to consider.
///
/// Returns `(expired_keys, live_rows)`: keys last updated before
/// `cutoff_millis`, and the remaining rows, which the caller checks for
/// corruption.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_purge_candidates(
    conn: &mut SqliteConnection,
    cutoff_millis: i64,
) -> Result<(Vec<String>, Vec<SessionRow>), PersistenceError> {
    let expired: Vec<String> = draft_sessions::table
        .filter(draft_sessions::updated_at.lt(cutoff_millis))
        .select(draft_sessions::session_key)
        .load::<String>(conn)?;

    let live: Vec<SessionRow> = draft_sessions::table
        .filter(draft_sessions::updated_at.ge(cutoff_millis))
        .select(SessionRow::as_select())
        .load(conn)?;

    debug!(
        expired = expired.len(),
        live = live.len(),
        "Loaded retention sweep candidates"
    );
    Ok((expired, live))
}

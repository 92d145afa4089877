// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use civdraft::DraftState;
use diesel::prelude::*;
use serde::Serialize;

use crate::diesel_schema::draft_sessions;

/// A decoded session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub state: DraftState,
    /// Prior states for undo, oldest first.
    pub history: Vec<DraftState>,
    pub version: i64,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub updated_at: i64,
}

/// Counts from one retention sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    /// Rows not updated within the retention window.
    pub expired: usize,
    /// Rows deleted because they could not be decoded.
    pub corrupt: usize,
}

impl PurgeReport {
    /// Total rows removed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.expired + self.corrupt
    }
}

/// Diesel Queryable struct for session rows.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = draft_sessions)]
pub struct SessionRow {
    pub session_key: String,
    pub state_json: String,
    pub history_json: String,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SessionRow {
    /// Decodes the JSON columns.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if either column fails to parse.
    pub fn decode(self) -> Result<SessionRecord, crate::PersistenceError> {
        let corrupt = |what: &str, err: &serde_json::Error| crate::PersistenceError::CorruptRecord {
            session_key: self.session_key.clone(),
            reason: format!("{what}: {err}"),
        };
        let state: DraftState =
            serde_json::from_str(&self.state_json).map_err(|e| corrupt("state", &e))?;
        let history: Vec<DraftState> =
            serde_json::from_str(&self.history_json).map_err(|e| corrupt("history", &e))?;

        Ok(SessionRecord {
            state,
            history,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Diesel Insertable struct for new session rows.
#[derive(Insertable)]
#[diesel(table_name = draft_sessions)]
pub struct NewSessionRow<'a> {
    pub session_key: &'a str,
    pub state_json: &'a str,
    pub history_json: &'a str,
    pub version: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use civdraft::CoreError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// The serialized record exceeds the payload ceiling.
    PayloadTooLarge {
        /// Size of the serialized state and history in bytes.
        size: usize,
        /// The ceiling in bytes.
        limit: usize,
    },
    /// A state or history entry failed its structural check.
    InvalidRecord(String),
    /// A stored row could not be decoded.
    CorruptRecord {
        /// The affected session key.
        session_key: String,
        /// What failed to decode.
        reason: String,
    },
}

impl PersistenceError {
    /// Returns whether the failure is transient and the caller may retry.
    ///
    /// Only storage-side failures qualify; bad input will fail the same way
    /// again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::DatabaseConnectionFailed(_) | Self::QueryFailed(_)
        )
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::PayloadTooLarge { size, limit } => {
                write!(f, "Payload of {size} bytes exceeds the {limit} byte limit")
            }
            Self::InvalidRecord(msg) => write!(f, "Invalid record: {msg}"),
            Self::CorruptRecord {
                session_key,
                reason,
            } => {
                write!(f, "Stored session {session_key} is corrupt: {reason}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<CoreError> for PersistenceError {
    fn from(err: CoreError) -> Self {
        Self::InvalidRecord(err.to_string())
    }
}

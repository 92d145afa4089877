// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The draft configuration is not a JSON object.
    ConfigNotAnObject,
    /// A configuration field is missing, mistyped, or out of range.
    InvalidField {
        /// The field that was invalid.
        field: &'static str,
        /// A human-readable description of the problem.
        reason: String,
    },
    /// A pool references an id that is not in the static catalog.
    UnknownPoolItem {
        /// The pool the id appeared in (`civPool` or `mapPool`).
        pool: &'static str,
        /// The unknown id.
        id: String,
    },
    /// A pool lists the same id more than once.
    DuplicatePoolItem {
        /// The pool the id appeared in.
        pool: &'static str,
        /// The repeated id.
        id: String,
    },
    /// A single draft step is malformed.
    InvalidStep {
        /// Zero-based index of the step.
        index: usize,
        /// A human-readable description of the problem.
        reason: String,
    },
    /// A step could run out of selectable items in the worst case.
    UnsatisfiableStep {
        /// Zero-based index of the step.
        index: usize,
        /// Size of the pool the step selects from.
        pool_size: usize,
        /// Worst-case number of items excluded when the step is reached.
        excluded: usize,
    },
    /// A team roster does not match the configured team size.
    InvalidRoster {
        /// The roster field (`team1Players` or `team2Players`).
        field: &'static str,
        /// A human-readable description of the problem.
        reason: String,
    },
    /// A session key does not match the fixed key format.
    InvalidSessionKey(String),
    /// A role string is not one of the known roles.
    InvalidRole(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigNotAnObject => write!(f, "Draft configuration must be an object"),
            Self::InvalidField { field, reason } => {
                write!(f, "Invalid field '{field}': {reason}")
            }
            Self::UnknownPoolItem { pool, id } => {
                write!(f, "Unknown id '{id}' in {pool}")
            }
            Self::DuplicatePoolItem { pool, id } => {
                write!(f, "Duplicate id '{id}' in {pool}")
            }
            Self::InvalidStep { index, reason } => {
                write!(f, "Invalid step {index}: {reason}")
            }
            Self::UnsatisfiableStep {
                index,
                pool_size,
                excluded,
            } => {
                write!(
                    f,
                    "Step {index} can run out of choices: pool has {pool_size} entries but up to {excluded} may be excluded"
                )
            }
            Self::InvalidRoster { field, reason } => {
                write!(f, "Invalid roster '{field}': {reason}")
            }
            Self::InvalidSessionKey(key) => write!(f, "Invalid session key: '{key}'"),
            Self::InvalidRole(role) => write!(f, "Invalid role: '{role}'"),
        }
    }
}

impl std::error::Error for DomainError {}

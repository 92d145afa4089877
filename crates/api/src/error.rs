// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::request_response::RequestError;
use civdraft::CoreError;
use civdraft_domain::DomainError;
use civdraft_persistence::PersistenceError;
use tracing::error;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// Callers can tell "fix your input" apart from "try again later" through
/// [`ApiError::is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A draft rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The serialized session exceeds the storage ceiling.
    PayloadTooLarge {
        /// Serialized size in bytes.
        size: usize,
        /// The ceiling in bytes.
        limit: usize,
    },
    /// Storage is temporarily unavailable.
    StorageUnavailable {
        /// A description of the failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns whether the same request may succeed if retried unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Draft rule violation ({rule}): {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::PayloadTooLarge { size, limit } => {
                write!(f, "Payload of {size} bytes exceeds the {limit} byte limit")
            }
            Self::StorageUnavailable { message } => {
                write!(f, "Storage unavailable: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        translate_persistence_error(err)
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::InvalidInput {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// Every domain error describes bad input, so all of them map to
/// `InvalidInput` with the offending field.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: String = match &err {
        DomainError::ConfigNotAnObject => String::from("config"),
        DomainError::InvalidField { field, .. } | DomainError::InvalidRoster { field, .. } => {
            (*field).to_string()
        }
        DomainError::UnknownPoolItem { pool, .. } | DomainError::DuplicatePoolItem { pool, .. } => {
            (*pool).to_string()
        }
        DomainError::InvalidStep { index, .. } | DomainError::UnsatisfiableStep { index, .. } => {
            format!("steps[{index}]")
        }
        DomainError::InvalidSessionKey(_) => String::from("key"),
        DomainError::InvalidRole(_) => String::from("role"),
    };
    ApiError::InvalidInput {
        field,
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    let rule: &str = match &err {
        CoreError::DomainViolation(domain) => return translate_domain_error(domain.clone()),
        CoreError::MalformedState(reason) => {
            return ApiError::InvalidInput {
                field: String::from("state"),
                message: reason.clone(),
            };
        }
        CoreError::RoleCannotAct { .. } => "role_cannot_act",
        CoreError::NotYourTurn { .. } => "not_your_turn",
        CoreError::DraftNotStarted => "draft_not_started",
        CoreError::DraftCompleted => "draft_completed",
        CoreError::WrongStepKind { .. } => "wrong_step_kind",
        CoreError::ItemUnavailable { .. } => "item_unavailable",
        CoreError::HiddenBanQuotaReached { .. } => "hidden_ban_quota_reached",
    };
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

/// Translates a persistence error into an API error.
///
/// Connection and query failures become retryable; everything else is
/// either a client mistake or an internal fault.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::PayloadTooLarge { size, limit } => ApiError::PayloadTooLarge { size, limit },
        PersistenceError::InvalidRecord(message) => ApiError::InvalidInput {
            field: String::from("state"),
            message,
        },
        err if err.is_retryable() => {
            error!(error = %err, "Storage failure");
            ApiError::StorageUnavailable {
                message: err.to_string(),
            }
        }
        err => {
            error!(error = %err, "Persistence error");
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API layer.
//!
//! Requests are parsed into typed values before any storage access, so
//! malformed input never reaches the per-session write lock.

use civdraft::{DraftState, Mutation};
use civdraft_domain::{CIVILIZATIONS, Civilization, DraftConfig, MAPS, Map, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Request parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// A required field is absent or empty.
    #[error("Missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The action tag names no known mutation.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    /// The role is not one of the known roles.
    #[error("Invalid role '{0}': expected admin, team1, team2, or spectator")]
    InvalidRole(String),

    /// A field has the wrong shape.
    #[error("Malformed '{field}': {reason}")]
    Malformed { field: &'static str, reason: String },
}

impl RequestError {
    /// The request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::Malformed { field, .. } => field,
            Self::UnknownAction(_) => "action",
            Self::InvalidRole(_) => "role",
        }
    }
}

/// Parses a role string.
///
/// # Errors
///
/// Returns `RequestError::InvalidRole` for anything but the four known roles.
pub fn parse_role(raw: &str) -> Result<Role, RequestError> {
    raw.parse::<Role>()
        .map_err(|_| RequestError::InvalidRole(raw.chars().take(32).collect()))
}

/// Body of a session action request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    /// The action tag, e.g. `apply-action`.
    pub action: Option<String>,
    /// The acting role.
    pub role: Option<String>,
    /// The item for `apply-action` and `submit-hidden-ban`.
    pub item_id: Option<String>,
}

impl ActionRequest {
    /// Converts the loosely typed body into a role and a mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the action is missing or unknown, the role is
    /// missing or invalid, or the action needs an item id and none was given.
    pub fn parse(self) -> Result<(Role, Mutation), RequestError> {
        let action: String = non_empty(self.action, "action")?;
        let role: Role = parse_role(&non_empty(self.role, "role")?)?;

        let mutation: Mutation = match action.as_str() {
            "mark-ready" => Mutation::MarkReady,
            "init-hidden-ban" => Mutation::InitHiddenBanPhase,
            "submit-hidden-ban" => Mutation::SubmitHiddenBan {
                item_id: non_empty(self.item_id, "itemId")?,
            },
            "auto-resolve" => Mutation::ResolveAutoStep,
            "apply-action" => Mutation::ApplyAction {
                item_id: non_empty(self.item_id, "itemId")?,
            },
            "undo" => Mutation::Undo,
            _ => {
                return Err(RequestError::UnknownAction(
                    action.chars().take(32).collect(),
                ));
            }
        };

        Ok((role, mutation))
    }
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, RequestError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingField { field })
}

/// Body of a full-state upsert.
///
/// Fields stay as raw JSON until the embedded config has been validated.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpsertSessionRequest {
    pub state: Value,
    #[serde(default)]
    pub history: Vec<Value>,
}

/// Body of a session creation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateSessionRequest {
    pub config: Value,
}

/// A session as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DraftState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<DraftState>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl SessionResponse {
    /// The response for a key with no record.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            exists: false,
            state: None,
            history: None,
            version: None,
        }
    }
}

/// Cheap polling response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// Result of a full-state upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub ok: bool,
    pub version: i64,
}

/// Result of a session action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub ok: bool,
    /// The stored version after the action.
    pub version: i64,
    /// False when the action was a harmless no-op and nothing was written.
    pub changed: bool,
    /// The item chosen by an auto-resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_id: Option<String>,
    /// True when this action completed a hidden ban phase.
    #[serde(default)]
    pub revealed: bool,
}

/// Result of creating a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_key: String,
    pub version: i64,
    pub state: DraftState,
}

/// Result of deleting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub existed: bool,
}

/// Result of validating a config without storing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateConfigResponse {
    pub valid: bool,
    /// The config with defaults filled in.
    pub config: DraftConfig,
}

/// The static civilization and map catalog.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogResponse {
    pub civilizations: &'static [Civilization],
    pub maps: &'static [Map],
}

impl CatalogResponse {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            civilizations: CIVILIZATIONS,
            maps: MAPS,
        }
    }
}

impl Default for CatalogResponse {
    fn default() -> Self {
        Self::new()
    }
}

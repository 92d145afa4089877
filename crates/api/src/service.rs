// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The mutation gateway and session operations.

use civdraft::{
    DraftState, ItemChooser, Mutation, RandomChooser, TransitionResult, apply_mutation,
    redact_hidden_bans,
};
use civdraft_domain::{DraftConfig, Role, SessionKey, validate_draft_config};
use civdraft_persistence::{PurgeReport, SessionRecord, SessionStore, SessionWriter};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::notify::{ChangeNotifier, SessionEvent, Subscription};
use crate::request_response::{
    ActionRequest, ActionResponse, CatalogResponse, CreateSessionResponse, DeleteResponse,
    RequestError, SessionResponse, UpsertSessionRequest, ValidateConfigResponse, VersionResponse,
    WriteResponse,
};

/// Attempts at finding an unused key before giving up.
const KEY_ATTEMPTS: usize = 4;

/// Session operations shared by every transport.
///
/// All writes for one key run under that key's write lock, and every
/// accepted write is announced through the [`ChangeNotifier`].
#[derive(Clone)]
pub struct DraftService {
    store: SessionStore,
    notifier: ChangeNotifier,
}

impl DraftService {
    /// Creates a service over `store`, announcing writes on `notifier`.
    #[must_use]
    pub const fn new(store: SessionStore, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }

    /// The notifier writes are announced on.
    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// The static civilization and map catalog.
    #[must_use]
    pub const fn catalog() -> CatalogResponse {
        CatalogResponse::new()
    }

    /// Validates a config without storing anything.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` naming the first rule the config breaks.
    pub fn validate_config(raw: &Value) -> Result<ValidateConfigResponse, ApiError> {
        let config: DraftConfig = validate_draft_config(raw)?;
        Ok(ValidateConfigResponse {
            valid: true,
            config,
        })
    }

    /// Creates a session under a fresh key.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, no unused key was found,
    /// or the write fails.
    pub async fn create_session(&self, raw_config: &Value) -> Result<CreateSessionResponse, ApiError> {
        let config: DraftConfig = validate_draft_config(raw_config)?;
        let state: DraftState = DraftState::new(config);

        for _ in 0..KEY_ATTEMPTS {
            let key: SessionKey = SessionKey::generate();
            let writer: SessionWriter = self.store.lock(&key).await;
            if writer.read().await?.is_some() {
                warn!(session_key = %key, "Generated key already in use");
                continue;
            }

            let version: i64 = writer.write(&state, &[]).await?;
            self.notifier.publish(&key, SessionEvent::Updated { version });
            info!(session_key = %key, name = %state.config.name, "Created draft session");

            return Ok(CreateSessionResponse {
                session_key: key.to_string(),
                version,
                state,
            });
        }

        Err(ApiError::Internal {
            message: String::from("Could not allocate an unused session key"),
        })
    }

    /// Reads a session as `viewer` sees it.
    ///
    /// Hidden bans are redacted in the state and in every history entry. A
    /// missing key is `exists: false`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn get_session(
        &self,
        key: &SessionKey,
        viewer: Role,
    ) -> Result<SessionResponse, ApiError> {
        let Some(record) = self.store.read(key).await? else {
            return Ok(SessionResponse::missing());
        };

        Ok(SessionResponse {
            exists: true,
            state: Some(redact_hidden_bans(&record.state, viewer)),
            history: Some(
                record
                    .history
                    .iter()
                    .map(|entry| redact_hidden_bans(entry, viewer))
                    .collect(),
            ),
            version: Some(record.version),
        })
    }

    /// Returns only the version, for polling clients.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn session_version(&self, key: &SessionKey) -> Result<VersionResponse, ApiError> {
        let version: Option<i64> = self.store.version(key).await?;
        Ok(VersionResponse {
            exists: version.is_some(),
            version,
        })
    }

    /// Replaces a session's state and history wholesale.
    ///
    /// The embedded config is validated before the write lock is taken, and
    /// every history entry must carry the same config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or state is invalid, the record is too
    /// large, or the write fails.
    pub async fn put_session(
        &self,
        key: &SessionKey,
        request: UpsertSessionRequest,
    ) -> Result<WriteResponse, ApiError> {
        let (state, history) = parse_upsert(request)?;

        let writer: SessionWriter = self.store.lock(key).await;
        let version: i64 = writer.write(&state, &history).await?;
        self.notifier.publish(key, SessionEvent::Updated { version });
        drop(writer);

        info!(session_key = %key, version, "Replaced draft session");
        Ok(WriteResponse { ok: true, version })
    }

    /// Parses and performs one session action.
    ///
    /// The request is fully parsed before the write lock is taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is malformed, the session is missing,
    /// the transition is rejected, or storage fails.
    pub async fn perform_action(
        &self,
        key: &SessionKey,
        request: ActionRequest,
    ) -> Result<ActionResponse, ApiError> {
        let (role, mutation) = request.parse().map_err(|e: RequestError| {
            warn!(session_key = %key, error = %e, "Rejected malformed action");
            e
        })?;
        self.perform_mutation(key, role, mutation, &mut RandomChooser)
            .await
    }

    /// Performs one mutation as a single read-modify-write under the key's lock.
    ///
    /// A mutation that changes nothing is not written, and the response
    /// carries the current version with `changed: false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is missing, the transition is
    /// rejected, or storage fails.
    pub async fn perform_mutation<C>(
        &self,
        key: &SessionKey,
        role: Role,
        mutation: Mutation,
        chooser: &mut C,
    ) -> Result<ActionResponse, ApiError>
    where
        C: ItemChooser + Send,
    {
        let kind: &'static str = mutation.kind();
        let writer: SessionWriter = self.store.lock(key).await;

        let record: SessionRecord = writer.read().await?.ok_or_else(|| {
            warn!(session_key = %key, action = kind, "Action on missing session");
            session_not_found(key)
        })?;

        let result: TransitionResult =
            apply_mutation(&record.state, &record.history, role, mutation, chooser).map_err(
                |e| {
                    warn!(session_key = %key, action = kind, role = %role, error = %e, "Rejected action");
                    ApiError::from(e)
                },
            )?;

        if !result.changed {
            info!(
                session_key = %key,
                action = kind,
                role = %role,
                version = record.version,
                "Action was a no-op"
            );
            return Ok(ActionResponse {
                ok: true,
                version: record.version,
                changed: false,
                picked_id: None,
                revealed: false,
            });
        }

        let version: i64 = writer.write(&result.new_state, &result.new_history).await?;
        self.notifier.publish(key, SessionEvent::Updated { version });
        drop(writer);

        info!(
            session_key = %key,
            action = kind,
            role = %role,
            version,
            picked_id = result.picked_id.as_deref(),
            revealed = result.revealed,
            "Applied action"
        );
        Ok(ActionResponse {
            ok: true,
            version,
            changed: true,
            picked_id: result.picked_id,
            revealed: result.revealed,
        })
    }

    /// Deletes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn delete_session(&self, key: &SessionKey) -> Result<DeleteResponse, ApiError> {
        let writer: SessionWriter = self.store.lock(key).await;
        let existed: bool = writer.delete().await?;
        if existed {
            self.notifier.publish(key, SessionEvent::Deleted);
            info!(session_key = %key, "Deleted draft session");
        }
        drop(writer);

        Ok(DeleteResponse { ok: true, existed })
    }

    /// Subscribes to change events for `key`.
    #[must_use]
    pub fn subscribe(&self, key: &SessionKey) -> Subscription {
        self.notifier.subscribe(key)
    }

    /// Deletes sessions idle for longer than `retention`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub async fn purge_expired(&self, retention: Duration) -> Result<PurgeReport, ApiError> {
        self.store
            .purge_expired(retention)
            .await
            .map_err(ApiError::from)
    }
}

fn session_not_found(key: &SessionKey) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from("Session"),
        message: format!("No session with key '{key}'"),
    }
}

/// Validates an upsert body and shares the config across all entries.
fn parse_upsert(request: UpsertSessionRequest) -> Result<(DraftState, Vec<DraftState>), ApiError> {
    let raw_config: &Value = request
        .state
        .get("config")
        .ok_or(RequestError::MissingField {
            field: "state.config",
        })?;
    let config: Arc<DraftConfig> = Arc::new(validate_draft_config(raw_config)?);

    let mut state: DraftState = decode_state(request.state, "state")?;
    if *state.config != *config {
        return Err(RequestError::Malformed {
            field: "state.config",
            reason: String::from("config is not in canonical form"),
        }
        .into());
    }
    state.config = Arc::clone(&config);

    let history: Vec<DraftState> = request
        .history
        .into_iter()
        .map(|raw| {
            let mut entry: DraftState = decode_state(raw, "history")?;
            if *entry.config != *config {
                return Err(ApiError::from(RequestError::Malformed {
                    field: "history",
                    reason: String::from("history entry uses a different config"),
                }));
            }
            entry.config = Arc::clone(&config);
            Ok(entry)
        })
        .collect::<Result<Vec<DraftState>, ApiError>>()?;

    Ok((state, history))
}

fn decode_state(raw: Value, field: &'static str) -> Result<DraftState, ApiError> {
    serde_json::from_value(raw).map_err(|e| {
        ApiError::from(RequestError::Malformed {
            field,
            reason: e.to_string(),
        })
    })
}

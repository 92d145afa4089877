// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Extractors for the session key and viewer role.
//!
//! Every route that addresses a session takes its key through
//! [`SessionKeyPath`], so a malformed key is rejected before any handler,
//! lock, or query sees it.

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{StatusCode, request::Parts},
};
use civdraft_api::{ApiError, parse_role};
use civdraft_domain::{Role, SessionKey};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::HttpError;

/// A validated session key taken from the `{key}` path segment.
#[derive(Debug, Clone)]
pub struct SessionKeyPath(pub SessionKey);

impl<S> FromRequestParts<S> for SessionKeyPath
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| HttpError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

        let key: SessionKey = SessionKey::parse(&raw).map_err(|e| {
            warn!(error = %e, "Rejected malformed session key");
            HttpError::from(ApiError::from(e))
        })?;

        Ok(Self(key))
    }
}

#[derive(Debug, Deserialize)]
struct RoleQuery {
    role: Option<String>,
}

/// The role a read is performed as, from `?role=`.
///
/// An absent role reads as a spectator, which sees the least.
#[derive(Debug, Clone, Copy)]
pub struct ViewerRole(pub Role);

impl<S> FromRequestParts<S> for ViewerRole
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query): Query<RoleQuery> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e| HttpError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

        let role: Role = match query.role.as_deref() {
            None | Some("") => Role::Spectator,
            Some(raw) => parse_role(raw).map_err(|e| HttpError::from(ApiError::from(e)))?,
        };
        debug!(role = %role, "Resolved viewer role");

        Ok(Self(role))
    }
}

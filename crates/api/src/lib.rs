// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation gateway and change notification for draft sessions.
//!
//! [`DraftService`] is the single entry point transports call. It parses
//! requests into typed mutations, runs each mutation as one locked
//! read-modify-write against the session store, and announces accepted
//! writes through the [`ChangeNotifier`].

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

mod error;
mod notify;
mod request_response;
mod service;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use notify::{ChangeNotifier, SessionEvent, Subscription};
pub use request_response::{
    ActionRequest, ActionResponse, CatalogResponse, CreateSessionRequest, CreateSessionResponse,
    DeleteResponse, RequestError, SessionResponse, UpsertSessionRequest, ValidateConfigResponse,
    VersionResponse, WriteResponse, parse_role,
};
pub use service::DraftService;

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod catalog;
mod error;
mod session_key;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use catalog::{CIVILIZATIONS, Civilization, MAPS, Map, MapType, find_civilization, find_map};
pub use error::DomainError;
pub use session_key::{SESSION_KEY_ALPHABET, SESSION_KEY_LEN, SessionKey};
pub use types::{
    BanMode, DraftAction, DraftConfig, DraftStep, DraftTarget, PlayerSlot, Role, Team,
};
pub use validation::{
    MAX_NAME_LEN, MAX_POOL_SIZE, MAX_STEPS, MAX_TEAM_SIZE, check_satisfiable, hidden_run_len,
    validate_draft_config,
};

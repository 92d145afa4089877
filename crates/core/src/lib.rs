// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The draft state machine.
//!
//! Everything here is pure: functions take a `DraftState` by reference and
//! return a new one. Persistence and locking live in the layers above.

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

mod apply;
mod availability;
mod chooser;
mod command;
mod error;
mod hidden_ban;
mod state;

#[cfg(test)]
mod tests;

pub use apply::{apply_action, apply_mutation, resolve_auto_step, resolve_auto_step_with};
pub use availability::{
    available_civs, available_for_hidden_ban, available_items, available_maps, player_civ_picks,
};
pub use chooser::{ItemChooser, RandomChooser};
pub use command::Mutation;
pub use error::CoreError;
pub use hidden_ban::{
    HIDDEN_BAN_PLACEHOLDER, HiddenBanOutcome, apply_hidden_ban, detect_hidden_phase,
    init_hidden_ban_phase, redact_hidden_bans,
};
pub use state::{
    DraftState, HiddenBanPhase, MAX_HISTORY, TeamDraftData, TransitionResult, push_history,
};

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Legal choice sets for the current step.
//!
//! All functions return ids in pool order.

use crate::state::{DraftState, TeamDraftData};
use civdraft_domain::{BanMode, DraftAction, DraftStep, DraftTarget, Team};
use std::collections::HashSet;

/// Returns the civilizations the current step may select.
///
/// The set is computed for the current step's action and team as if it
/// targeted civilizations. Returns an empty set once the draft is complete.
#[must_use]
pub fn available_civs(state: &DraftState) -> Vec<String> {
    state
        .current_step()
        .map(|step| available_for(state, step, DraftTarget::Civ))
        .unwrap_or_default()
}

/// Returns the maps the current step may select.
///
/// See [`available_civs`].
#[must_use]
pub fn available_maps(state: &DraftState) -> Vec<String> {
    state
        .current_step()
        .map(|step| available_for(state, step, DraftTarget::Map))
        .unwrap_or_default()
}

/// Returns the legal choices for the current step's own target.
#[must_use]
pub fn available_items(state: &DraftState) -> Vec<String> {
    state
        .current_step()
        .map(|step| available_for(state, step, step.target))
        .unwrap_or_default()
}

/// Returns what `team` may submit during a hidden ban phase.
///
/// Excludes anything picked or revealed-banned by either team and anything
/// `team` already buffered. The opponent's buffer is never consulted.
/// Returns an empty set when the current step is not a hidden ban.
#[must_use]
pub fn available_for_hidden_ban(state: &DraftState, team: Team) -> Vec<String> {
    let target: DraftTarget = match (&state.hidden_ban_phase, state.current_step()) {
        (Some(phase), _) => phase.target,
        (None, Some(step)) if step.hidden && step.action == DraftAction::Ban => step.target,
        _ => return Vec::new(),
    };

    let mut excluded: HashSet<&str> = HashSet::new();
    for side in [Team::Team1, Team::Team2] {
        excluded.extend(state.team(side).picks(target).iter().map(String::as_str));
        excluded.extend(state.team(side).bans(target).iter().map(String::as_str));
    }
    if let Some(phase) = &state.hidden_ban_phase {
        excluded.extend(phase.bans(team).iter().map(String::as_str));
    }

    filter_pool(state.config.pool(target), &excluded)
}

fn available_for(state: &DraftState, step: &DraftStep, target: DraftTarget) -> Vec<String> {
    let mut excluded: HashSet<&str> = HashSet::new();
    let own: &TeamDraftData = state.team(step.team);
    let opponent: &TeamDraftData = state.team(step.team.opponent());

    match step.action {
        DraftAction::Ban => {
            excluded.extend(own.picks(target).iter().map(String::as_str));
            excluded.extend(opponent.picks(target).iter().map(String::as_str));
            excluded.extend(own.bans(target).iter().map(String::as_str));
            if state.config.ban_mode == BanMode::Global {
                excluded.extend(opponent.bans(target).iter().map(String::as_str));
            }
        }
        DraftAction::Pick => {
            excluded.extend(opponent.bans(target).iter().map(String::as_str));
            if state.config.ban_mode == BanMode::Global {
                excluded.extend(own.bans(target).iter().map(String::as_str));
            }

            match (target, step.player_index) {
                (DraftTarget::Map, _) => {
                    excluded.extend(own.picks(target).iter().map(String::as_str));
                    excluded.extend(opponent.picks(target).iter().map(String::as_str));
                }
                (DraftTarget::Civ, Some(player)) => {
                    excluded.extend(player_civ_picks(state, step.team, player));
                    if !state.config.allow_duplicate_picks {
                        excluded.extend(own.civ_picks.iter().map(String::as_str));
                    }
                }
                (DraftTarget::Civ, None) => {
                    excluded.extend(own.civ_picks.iter().map(String::as_str));
                }
            }
        }
    }

    filter_pool(state.config.pool(target), &excluded)
}

/// Returns the civilizations one player has picked so far.
///
/// The n-th resolved civ pick step of a team recorded `civ_picks[n]`, so
/// replaying the resolved steps pairs each pick with its player.
#[must_use]
pub fn player_civ_picks(state: &DraftState, team: Team, player: u8) -> Vec<&str> {
    let resolved: &[DraftStep] =
        &state.config.steps[..state.current_step_index.min(state.config.steps.len())];

    resolved
        .iter()
        .filter(|s| s.team == team && s.action == DraftAction::Pick && s.target == DraftTarget::Civ)
        .zip(state.team(team).civ_picks.iter())
        .filter(|(s, _)| s.player_index == Some(player))
        .map(|(_, id)| id.as_str())
        .collect()
}

fn filter_pool(pool: &[String], excluded: &HashSet<&str>) -> Vec<String> {
    pool.iter()
        .filter(|id| !excluded.contains(id.as_str()))
        .cloned()
        .collect()
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::availability::{available_for_hidden_ban, available_items};
use crate::chooser::{ItemChooser, RandomChooser};
use crate::command::Mutation;
use crate::error::CoreError;
use crate::hidden_ban::{HiddenBanOutcome, apply_hidden_ban, init_hidden_ban_phase};
use crate::state::{DraftState, TransitionResult, push_history};
use civdraft_domain::{DraftAction, DraftStep, Role, Team};

/// Resolves the current step with `item_id`.
///
/// Appends the item to the acting team's list for the step's action and
/// target and moves to the next step. The item is not checked here; callers
/// validate it against [`crate::available_items`] first.
///
/// Returns an unchanged copy when there is no current step.
#[must_use]
pub fn apply_action(state: &DraftState, item_id: &str) -> DraftState {
    let Some(step) = state.current_step() else {
        return state.clone();
    };
    let (team, action, target) = (step.team, step.action, step.target);

    let mut next: DraftState = state.clone();
    next.team_mut(team)
        .entries_mut(action, target)
        .push(item_id.to_string());
    next.advance(1);
    next
}

/// Resolves the current auto step with a uniformly random available item.
///
/// Returns the new state and the chosen id. If the current step is not an
/// auto step, or nothing is available, the state is returned unchanged with
/// no id.
#[must_use]
pub fn resolve_auto_step(state: &DraftState) -> (DraftState, Option<String>) {
    resolve_auto_step_with(state, &mut RandomChooser)
}

/// Like [`resolve_auto_step`], choosing with `chooser`.
///
/// The choice set is computed from `state` at call time.
#[must_use]
pub fn resolve_auto_step_with(
    state: &DraftState,
    chooser: &mut impl ItemChooser,
) -> (DraftState, Option<String>) {
    if !state.current_step().is_some_and(|s| s.auto) {
        return (state.clone(), None);
    }

    let available: Vec<String> = available_items(state);
    match chooser.choose(&available) {
        Some(id) => (apply_action(state, id), Some(id.clone())),
        None => (state.clone(), None),
    }
}

/// Applies a mutation on behalf of `role`.
///
/// This is the validating entry point used by the mutation gateway. It
/// enforces who may act and what may be chosen, then delegates to the pure
/// transitions. Race-losing mutations (an auto step someone else already
/// resolved, a hidden phase already opened) succeed with `changed == false`.
///
/// # Arguments
///
/// * `state` - The current stored state
/// * `history` - The current undo history, oldest first
/// * `role` - The role performing the mutation
/// * `mutation` - The requested mutation
/// * `chooser` - The choice source for auto steps
///
/// # Returns
///
/// * `Ok(TransitionResult)` with the new state and history
/// * `Err(CoreError)` if the mutation is not allowed
///
/// # Errors
///
/// Returns an error if:
/// - The role may not perform the mutation
/// - Drafting has not started or is already complete
/// - The current step is of a different kind or belongs to the other team
/// - The item is not available
/// - The team already submitted all of its hidden bans
pub fn apply_mutation(
    state: &DraftState,
    history: &[DraftState],
    role: Role,
    mutation: Mutation,
    chooser: &mut impl ItemChooser,
) -> Result<TransitionResult, CoreError> {
    if role == Role::Spectator {
        return Err(CoreError::RoleCannotAct {
            role,
            mutation: mutation.kind(),
        });
    }

    match mutation {
        Mutation::MarkReady => mark_ready(state, history, role),
        Mutation::InitHiddenBanPhase => {
            require_started(state)?;
            Ok(init_hidden_ban_phase(state).map_or_else(
                || TransitionResult::unchanged(state, history),
                |next| TransitionResult::changed(next, history.to_vec()),
            ))
        }
        Mutation::SubmitHiddenBan { item_id } => {
            submit_hidden_ban(state, history, role, &item_id)
        }
        Mutation::ResolveAutoStep => {
            require_started(state)?;
            let (next, picked_id) = resolve_auto_step_with(state, chooser);
            if picked_id.is_none() {
                return Ok(TransitionResult::unchanged(state, history));
            }
            let mut result: TransitionResult =
                TransitionResult::changed(next, push_history(history, state));
            result.picked_id = picked_id;
            Ok(result)
        }
        Mutation::ApplyAction { item_id } => {
            let step: &DraftStep = require_current_step(state)?;
            if step.hidden || step.auto {
                return Err(CoreError::WrongStepKind {
                    step_index: state.current_step_index,
                    expected: "manual",
                });
            }
            if !role.controls(step.team) {
                return Err(CoreError::NotYourTurn {
                    role,
                    team: step.team,
                });
            }
            if !available_items(state).contains(&item_id) {
                return Err(CoreError::ItemUnavailable { item_id });
            }
            Ok(TransitionResult::changed(
                apply_action(state, &item_id),
                push_history(history, state),
            ))
        }
        Mutation::Undo => {
            if role != Role::Admin {
                return Err(CoreError::RoleCannotAct {
                    role,
                    mutation: Mutation::Undo.kind(),
                });
            }
            let Some((previous, rest)) = history.split_last() else {
                return Ok(TransitionResult::unchanged(state, history));
            };
            Ok(TransitionResult::changed(previous.clone(), rest.to_vec()))
        }
    }
}

fn mark_ready(
    state: &DraftState,
    history: &[DraftState],
    role: Role,
) -> Result<TransitionResult, CoreError> {
    let team: Team = role.team().ok_or(CoreError::RoleCannotAct {
        role,
        mutation: Mutation::MarkReady.kind(),
    })?;
    if state.is_ready(team) {
        return Ok(TransitionResult::unchanged(state, history));
    }

    let mut next: DraftState = state.clone();
    next.ready_players.insert(team, true);
    Ok(TransitionResult::changed(next, history.to_vec()))
}

fn submit_hidden_ban(
    state: &DraftState,
    history: &[DraftState],
    role: Role,
    item_id: &str,
) -> Result<TransitionResult, CoreError> {
    let team: Team = role.team().ok_or(CoreError::RoleCannotAct {
        role,
        mutation: "submit-hidden-ban",
    })?;
    let step: &DraftStep = require_current_step(state)?;
    if !step.hidden || step.action != DraftAction::Ban {
        return Err(CoreError::WrongStepKind {
            step_index: state.current_step_index,
            expected: "hidden ban",
        });
    }

    let quota_reached: bool = state
        .hidden_ban_phase
        .as_ref()
        .is_some_and(|phase| phase.is_team_complete(team));
    if quota_reached {
        return Err(CoreError::HiddenBanQuotaReached { team });
    }
    if !available_for_hidden_ban(state, team).iter().any(|id| id == item_id) {
        return Err(CoreError::ItemUnavailable {
            item_id: item_id.to_string(),
        });
    }

    let outcome: HiddenBanOutcome =
        apply_hidden_ban(state, team, item_id).ok_or(CoreError::HiddenBanQuotaReached { team })?;
    let mut result: TransitionResult =
        TransitionResult::changed(outcome.state, push_history(history, state));
    result.revealed = outcome.revealed;
    Ok(result)
}

fn require_started(state: &DraftState) -> Result<(), CoreError> {
    if state.both_ready() {
        Ok(())
    } else {
        Err(CoreError::DraftNotStarted)
    }
}

fn require_current_step(state: &DraftState) -> Result<&DraftStep, CoreError> {
    require_started(state)?;
    state.current_step().ok_or(CoreError::DraftCompleted)
}

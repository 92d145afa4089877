// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::state::{DraftState, HiddenBanPhase};
use civdraft_domain::{DraftAction, DraftStep, Role, Team, hidden_run_len};
use std::slice::Iter;

/// Stand-in for a ban the viewer is not allowed to see.
pub const HIDDEN_BAN_PLACEHOLDER: &str = "hidden";

/// Describes the hidden ban run starting at the current step.
///
/// Returns `None` if the current step is not a hidden ban, or if the run
/// does not include steps for both teams.
#[must_use]
pub fn detect_hidden_phase(state: &DraftState) -> Option<HiddenBanPhase> {
    let start_index: usize = state.current_step_index;
    let run_len: usize = hidden_run_len(&state.config.steps, start_index);
    if run_len == 0 {
        return None;
    }

    let run: &[DraftStep] = &state.config.steps[start_index..start_index + run_len];
    let team1_count: usize = run.iter().filter(|s| s.team == Team::Team1).count();
    let team2_count: usize = run_len - team1_count;
    if team1_count == 0 || team2_count == 0 {
        return None;
    }

    Some(HiddenBanPhase {
        start_index,
        team1_bans: Vec::new(),
        team2_bans: Vec::new(),
        team1_count,
        team2_count,
        target: run[0].target,
    })
}

/// Opens the hidden ban phase at the current step.
///
/// Returns `None` when there is nothing to do: the phase already exists or
/// the current step does not start a valid hidden run. Racing initializers
/// therefore collapse into one.
#[must_use]
pub fn init_hidden_ban_phase(state: &DraftState) -> Option<DraftState> {
    if state.hidden_ban_phase.is_some() {
        return None;
    }
    let phase: HiddenBanPhase = detect_hidden_phase(state)?;

    let mut next: DraftState = state.clone();
    next.hidden_ban_phase = Some(phase);
    Some(next)
}

/// The state after a hidden ban submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenBanOutcome {
    pub state: DraftState,
    /// The submission completed both buffers and the phase was revealed.
    pub revealed: bool,
}

/// Buffers one hidden ban for `team`, revealing the phase if it is now full.
///
/// The phase is opened first if needed. The caller is responsible for
/// checking `item_id` against [`crate::available_for_hidden_ban`].
///
/// Returns `None` if there is no hidden run at the current step or `team`
/// has already filled its quota.
#[must_use]
pub fn apply_hidden_ban(state: &DraftState, team: Team, item_id: &str) -> Option<HiddenBanOutcome> {
    let mut phase: HiddenBanPhase = match &state.hidden_ban_phase {
        Some(phase) => phase.clone(),
        None => detect_hidden_phase(state)?,
    };
    if phase.is_team_complete(team) {
        return None;
    }

    phase.bans_mut(team).push(item_id.to_string());

    let mut next: DraftState = state.clone();
    if phase.is_complete() {
        reveal(&mut next, &phase);
        Some(HiddenBanOutcome {
            state: next,
            revealed: true,
        })
    } else {
        next.hidden_ban_phase = Some(phase);
        Some(HiddenBanOutcome {
            state: next,
            revealed: false,
        })
    }
}

/// Moves both buffers into the permanent ban lists in step order and skips
/// past the run.
fn reveal(state: &mut DraftState, phase: &HiddenBanPhase) {
    let end: usize = (phase.start_index + phase.run_len()).min(state.config.steps.len());
    let mut team1_bans: Iter<'_, String> = phase.team1_bans.iter();
    let mut team2_bans: Iter<'_, String> = phase.team2_bans.iter();

    for index in phase.start_index..end {
        let team: Team = state.config.steps[index].team;
        let next_ban: Option<&String> = match team {
            Team::Team1 => team1_bans.next(),
            Team::Team2 => team2_bans.next(),
        };
        if let Some(id) = next_ban {
            state
                .team_mut(team)
                .entries_mut(DraftAction::Ban, phase.target)
                .push(id.clone());
        }
    }

    state.hidden_ban_phase = None;
    state.advance(phase.run_len());
}

/// Returns a copy of `state` safe to show to `viewer`.
///
/// Team roles see their own buffer and placeholders for the opponent's.
/// Every other role sees placeholders for both. Counts are preserved and the
/// input is never modified; redacting an already redacted state is a no-op.
#[must_use]
pub fn redact_hidden_bans(state: &DraftState, viewer: Role) -> DraftState {
    let mut redacted: DraftState = state.clone();
    if let Some(phase) = redacted.hidden_ban_phase.as_mut() {
        for team in [Team::Team1, Team::Team2] {
            if viewer.team() != Some(team) {
                mask(phase.bans_mut(team));
            }
        }
    }
    redacted
}

fn mask(bans: &mut [String]) {
    for ban in bans {
        HIDDEN_BAN_PLACEHOLDER.clone_into(ban);
    }
}

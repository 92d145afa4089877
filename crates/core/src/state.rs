// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use civdraft_domain::{DraftAction, DraftConfig, DraftStep, DraftTarget, Team, hidden_run_len};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maximum number of prior states kept for undo.
pub const MAX_HISTORY: usize = 24;

/// The selections one team has made so far.
///
/// Each list grows by exactly one entry per resolved step of the matching
/// action and target, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraftData {
    pub civ_bans: Vec<String>,
    pub civ_picks: Vec<String>,
    pub map_bans: Vec<String>,
    pub map_picks: Vec<String>,
}

impl TeamDraftData {
    /// Returns the bans recorded against a target.
    #[must_use]
    pub fn bans(&self, target: DraftTarget) -> &[String] {
        match target {
            DraftTarget::Civ => &self.civ_bans,
            DraftTarget::Map => &self.map_bans,
        }
    }

    /// Returns the picks recorded for a target.
    #[must_use]
    pub fn picks(&self, target: DraftTarget) -> &[String] {
        match target {
            DraftTarget::Civ => &self.civ_picks,
            DraftTarget::Map => &self.map_picks,
        }
    }

    /// Returns the list a step of this kind appends to.
    #[must_use]
    pub fn entries(&self, action: DraftAction, target: DraftTarget) -> &[String] {
        match action {
            DraftAction::Ban => self.bans(target),
            DraftAction::Pick => self.picks(target),
        }
    }

    pub(crate) const fn entries_mut(
        &mut self,
        action: DraftAction,
        target: DraftTarget,
    ) -> &mut Vec<String> {
        match (action, target) {
            (DraftAction::Ban, DraftTarget::Civ) => &mut self.civ_bans,
            (DraftAction::Ban, DraftTarget::Map) => &mut self.map_bans,
            (DraftAction::Pick, DraftTarget::Civ) => &mut self.civ_picks,
            (DraftAction::Pick, DraftTarget::Map) => &mut self.map_picks,
        }
    }
}

/// A simultaneous blind-ban sub-phase in progress.
///
/// Each team's buffer holds the bans it has submitted so far. Buffers are
/// never visible to the opponent until both are full, at which point the
/// whole phase is revealed in one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenBanPhase {
    /// Index of the first step of the run.
    pub start_index: usize,
    pub team1_bans: Vec<String>,
    pub team2_bans: Vec<String>,
    /// Number of run steps owned by team 1.
    pub team1_count: usize,
    /// Number of run steps owned by team 2.
    pub team2_count: usize,
    /// The target every step of the run bans.
    pub target: DraftTarget,
}

impl HiddenBanPhase {
    /// Returns the bans a team has buffered.
    #[must_use]
    pub fn bans(&self, team: Team) -> &[String] {
        match team {
            Team::Team1 => &self.team1_bans,
            Team::Team2 => &self.team2_bans,
        }
    }

    pub(crate) const fn bans_mut(&mut self, team: Team) -> &mut Vec<String> {
        match team {
            Team::Team1 => &mut self.team1_bans,
            Team::Team2 => &mut self.team2_bans,
        }
    }

    /// Returns how many bans a team must submit.
    #[must_use]
    pub const fn required(&self, team: Team) -> usize {
        match team {
            Team::Team1 => self.team1_count,
            Team::Team2 => self.team2_count,
        }
    }

    /// Returns whether a team has filled its quota.
    #[must_use]
    pub fn is_team_complete(&self, team: Team) -> bool {
        self.bans(team).len() >= self.required(team)
    }

    /// Returns whether both teams have filled their quotas.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_team_complete(Team::Team1) && self.is_team_complete(Team::Team2)
    }

    /// Total number of steps the run covers.
    #[must_use]
    pub const fn run_len(&self) -> usize {
        self.team1_count + self.team2_count
    }
}

/// The full state of one draft.
///
/// Transitions never edit a state in place: every operation in this crate
/// takes `&DraftState` and returns a new value. The configuration is behind
/// an `Arc`, so the copies share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftState {
    pub config: Arc<DraftConfig>,
    pub current_step_index: usize,
    pub team1: TeamDraftData,
    pub team2: TeamDraftData,
    pub completed: bool,
    #[serde(default)]
    pub ready_players: BTreeMap<Team, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_ban_phase: Option<HiddenBanPhase>,
}

impl DraftState {
    /// Creates the initial state for a configuration.
    #[must_use]
    pub fn new(config: DraftConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    /// Creates the initial state for an already shared configuration.
    #[must_use]
    pub fn with_shared_config(config: Arc<DraftConfig>) -> Self {
        let completed: bool = config.steps.is_empty();
        Self {
            config,
            current_step_index: 0,
            team1: TeamDraftData::default(),
            team2: TeamDraftData::default(),
            completed,
            ready_players: BTreeMap::new(),
            hidden_ban_phase: None,
        }
    }

    /// Returns the step to be resolved next, or `None` once the draft is done.
    #[must_use]
    pub fn current_step(&self) -> Option<&DraftStep> {
        self.config.steps.get(self.current_step_index)
    }

    /// Returns a team's selections.
    #[must_use]
    pub const fn team(&self, team: Team) -> &TeamDraftData {
        match team {
            Team::Team1 => &self.team1,
            Team::Team2 => &self.team2,
        }
    }

    pub(crate) const fn team_mut(&mut self, team: Team) -> &mut TeamDraftData {
        match team {
            Team::Team1 => &mut self.team1,
            Team::Team2 => &mut self.team2,
        }
    }

    /// Returns whether a team has marked itself ready.
    #[must_use]
    pub fn is_ready(&self, team: Team) -> bool {
        self.ready_players.get(&team).copied().unwrap_or(false)
    }

    /// Returns whether both teams are ready to draft.
    #[must_use]
    pub fn both_ready(&self) -> bool {
        self.is_ready(Team::Team1) && self.is_ready(Team::Team2)
    }

    /// Moves the step cursor forward and refreshes `completed`.
    pub(crate) fn advance(&mut self, steps: usize) {
        self.current_step_index = (self.current_step_index + steps).min(self.config.steps.len());
        self.completed = self.current_step_index >= self.config.steps.len();
    }

    /// Checks the invariants every stored state must satisfy.
    ///
    /// Used at the storage boundary, where states may arrive from clients.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedState` if:
    /// - `completed` disagrees with the step cursor, or the cursor is past the end
    /// - A selection list does not match the number of resolved steps of its kind
    /// - A recorded id is not in the matching pool
    /// - The hidden ban phase does not describe the run at the cursor
    pub fn check_structure(&self) -> Result<(), CoreError> {
        let step_count: usize = self.config.steps.len();
        if self.current_step_index > step_count {
            return Err(malformed(format!(
                "currentStepIndex {} is past the last step ({step_count})",
                self.current_step_index
            )));
        }
        if self.completed != (self.current_step_index == step_count) {
            return Err(malformed(String::from(
                "completed flag does not match currentStepIndex",
            )));
        }

        let resolved: &[DraftStep] = &self.config.steps[..self.current_step_index];
        for team in [Team::Team1, Team::Team2] {
            for action in [DraftAction::Ban, DraftAction::Pick] {
                for target in [DraftTarget::Civ, DraftTarget::Map] {
                    let expected: usize = resolved
                        .iter()
                        .filter(|s| s.team == team && s.action == action && s.target == target)
                        .count();
                    let entries: &[String] = self.team(team).entries(action, target);
                    if entries.len() != expected {
                        return Err(malformed(format!(
                            "{team} has {} {} {} entries but {expected} steps were resolved",
                            entries.len(),
                            target.as_str(),
                            action.as_str()
                        )));
                    }
                    self.check_in_pool(entries, target)?;
                }
            }
        }

        if let Some(phase) = &self.hidden_ban_phase {
            self.check_hidden_phase(phase)?;
        }

        Ok(())
    }

    fn check_in_pool(&self, entries: &[String], target: DraftTarget) -> Result<(), CoreError> {
        let pool: &[String] = self.config.pool(target);
        match entries.iter().find(|id| !pool.contains(id)) {
            Some(id) => Err(malformed(format!(
                "'{id}' is not in the {} pool",
                target.as_str()
            ))),
            None => Ok(()),
        }
    }

    fn check_hidden_phase(&self, phase: &HiddenBanPhase) -> Result<(), CoreError> {
        if phase.start_index != self.current_step_index {
            return Err(malformed(String::from(
                "hidden ban phase does not start at the current step",
            )));
        }

        let run_len: usize = hidden_run_len(&self.config.steps, phase.start_index);
        let run: &[DraftStep] = &self.config.steps[phase.start_index..phase.start_index + run_len];
        let matches_run: bool = run_len > 0
            && run.first().is_some_and(|s| s.target == phase.target)
            && run.iter().filter(|s| s.team == Team::Team1).count() == phase.team1_count
            && run.iter().filter(|s| s.team == Team::Team2).count() == phase.team2_count;
        if !matches_run {
            return Err(malformed(String::from(
                "hidden ban phase does not match the hidden steps at the current step",
            )));
        }

        for team in [Team::Team1, Team::Team2] {
            if phase.bans(team).len() > phase.required(team) {
                return Err(malformed(format!("{team} buffered more hidden bans than allowed")));
            }
            self.check_in_pool(phase.bans(team), phase.target)?;
        }
        Ok(())
    }
}

fn malformed(reason: String) -> CoreError {
    CoreError::MalformedState(reason)
}

/// The result of a successful mutation.
///
/// When `changed` is false the mutation was a harmless no-op and nothing
/// should be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The state after the mutation.
    pub new_state: DraftState,
    /// The undo history after the mutation.
    pub new_history: Vec<DraftState>,
    /// Whether the mutation produced a new state.
    pub changed: bool,
    /// The item chosen by an auto-resolved step.
    pub picked_id: Option<String>,
    /// Whether a hidden ban phase was revealed.
    pub revealed: bool,
}

impl TransitionResult {
    pub(crate) fn unchanged(state: &DraftState, history: &[DraftState]) -> Self {
        Self {
            new_state: state.clone(),
            new_history: history.to_vec(),
            changed: false,
            picked_id: None,
            revealed: false,
        }
    }

    pub(crate) fn changed(new_state: DraftState, new_history: Vec<DraftState>) -> Self {
        Self {
            new_state,
            new_history,
            changed: true,
            picked_id: None,
            revealed: false,
        }
    }
}

/// Appends `prior` to the history, dropping the oldest entries past [`MAX_HISTORY`].
#[must_use]
pub fn push_history(history: &[DraftState], prior: &DraftState) -> Vec<DraftState> {
    let keep_from: usize = (history.len() + 1).saturating_sub(MAX_HISTORY);
    let mut next: Vec<DraftState> = history[keep_from..].to_vec();
    next.push(prior.clone());
    next
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DraftState, ItemChooser};
use civdraft_domain::{
    BanMode, DraftAction, DraftConfig, DraftStep, DraftTarget, PlayerSlot, Team,
};

pub const CIVS: [&str; 4] = ["english", "french", "hre", "mongols"];
pub const MAPS: [&str; 3] = ["altai", "lipany", "dry-arabia"];

pub fn ban(target: DraftTarget, team: Team) -> DraftStep {
    DraftStep::new(DraftAction::Ban, target, team)
}

pub fn pick(target: DraftTarget, team: Team) -> DraftStep {
    DraftStep::new(DraftAction::Pick, target, team)
}

pub fn create_test_config(steps: Vec<DraftStep>) -> DraftConfig {
    create_test_config_with(steps, BanMode::Global, 1, false)
}

pub fn create_test_config_with(
    steps: Vec<DraftStep>,
    ban_mode: BanMode,
    team_size: u8,
    allow_duplicate_picks: bool,
) -> DraftConfig {
    let roster = |prefix: &str| -> Vec<PlayerSlot> {
        (0..team_size)
            .map(|i| PlayerSlot::new(&format!("{prefix}{i}")))
            .collect()
    };
    DraftConfig {
        name: String::from("Test Draft"),
        team_size,
        ban_mode,
        allow_duplicate_picks,
        civ_pool: CIVS.iter().map(ToString::to_string).collect(),
        map_pool: MAPS.iter().map(ToString::to_string).collect(),
        steps,
        team1_name: String::from("Team 1"),
        team2_name: String::from("Team 2"),
        team1_players: roster("a"),
        team2_players: roster("b"),
    }
}

/// A state with both teams ready.
pub fn create_ready_state(config: DraftConfig) -> DraftState {
    let mut state: DraftState = DraftState::new(config);
    state.ready_players.insert(Team::Team1, true);
    state.ready_players.insert(Team::Team2, true);
    state
}

/// The standard ban/ban/pick/pick/auto-map 1v1 sequence.
pub fn standard_steps() -> Vec<DraftStep> {
    vec![
        ban(DraftTarget::Civ, Team::Team1),
        ban(DraftTarget::Civ, Team::Team2),
        pick(DraftTarget::Civ, Team::Team1).for_player(0),
        pick(DraftTarget::Civ, Team::Team2).for_player(0),
        pick(DraftTarget::Map, Team::Team1).auto(),
    ]
}

/// Two blind civ bans per team, followed by one pick each.
pub fn hidden_steps() -> Vec<DraftStep> {
    vec![
        ban(DraftTarget::Civ, Team::Team1).hidden(),
        ban(DraftTarget::Civ, Team::Team2).hidden(),
        ban(DraftTarget::Civ, Team::Team1).hidden(),
        ban(DraftTarget::Civ, Team::Team2).hidden(),
        pick(DraftTarget::Map, Team::Team1),
    ]
}

pub fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Always takes the item at a fixed position, clamped to the list.
pub struct FixedChooser(pub usize);

impl ItemChooser for FixedChooser {
    fn choose<'a>(&mut self, items: &'a [String]) -> Option<&'a String> {
        items.get(self.0.min(items.len().saturating_sub(1)))
    }
}

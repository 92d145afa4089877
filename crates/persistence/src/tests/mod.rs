// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod purge_tests;

use civdraft::{DraftState, apply_action};
use civdraft_domain::{DraftConfig, SessionKey, validate_draft_config};
use serde_json::json;

/// A validated 1v1 configuration with five steps.
pub fn create_test_config() -> DraftConfig {
    validate_draft_config(&json!({
        "name": "Store Test Cup",
        "teamSize": 1,
        "civPool": ["english", "french", "hre", "mongols"],
        "mapPool": ["altai", "lipany", "dry-arabia"],
        "steps": [
            {"action": "ban", "target": "civ", "team": "team1"},
            {"action": "ban", "target": "civ", "team": "team2"},
            {"action": "pick", "target": "civ", "team": "team1", "playerIndex": 0},
            {"action": "pick", "target": "civ", "team": "team2", "playerIndex": 0},
            {"action": "pick", "target": "map", "team": "team1", "auto": true}
        ],
        "team1Players": [{"name": "Alpha"}],
        "team2Players": [{"name": "Bravo"}]
    }))
    .expect("test config should validate")
}

pub fn create_initial_state() -> DraftState {
    DraftState::new(create_test_config())
}

/// Returns `state` after banning `english` and returns the prior state as history.
pub fn create_state_after_one_ban() -> (DraftState, Vec<DraftState>) {
    let initial: DraftState = create_initial_state();
    let next: DraftState = apply_action(&initial, "english");
    (next, vec![initial])
}

pub fn test_key(suffix: char) -> SessionKey {
    let raw: String = format!("TESTKEY23{suffix}");
    SessionKey::parse(&raw).expect("test key should parse")
}

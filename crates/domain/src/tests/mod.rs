// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod catalog;

use serde_json::{Value, json};

/// A valid 1v1 configuration with a small pool.
pub fn create_test_config_json() -> Value {
    json!({
        "name": "Weekly Cup",
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
    })
}

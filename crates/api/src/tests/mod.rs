// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod gateway_tests;

use crate::{ActionRequest, ActionResponse, ChangeNotifier, DraftService};
use civdraft::ItemChooser;
use civdraft_domain::SessionKey;
use civdraft_persistence::{Persistence, SessionStore};
use serde_json::{Value, json};

pub fn create_test_service() -> DraftService {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    DraftService::new(SessionStore::new(persistence), ChangeNotifier::new())
}

/// A 1v1 draft: ban, ban, pick, pick, then an auto map pick.
pub fn create_standard_config_json() -> Value {
    json!({
        "name": "Gateway Cup",
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

/// A 1v1 draft opening with two blind civ bans per team.
pub fn create_hidden_config_json() -> Value {
    json!({
        "name": "Blind Cup",
        "teamSize": 1,
        "civPool": ["english", "french", "hre", "mongols", "rus", "chinese", "delhi", "abbasid"],
        "mapPool": ["altai", "lipany", "dry-arabia"],
        "steps": [
            {"action": "ban", "target": "civ", "team": "team1", "hidden": true},
            {"action": "ban", "target": "civ", "team": "team2", "hidden": true},
            {"action": "ban", "target": "civ", "team": "team1", "hidden": true},
            {"action": "ban", "target": "civ", "team": "team2", "hidden": true},
            {"action": "pick", "target": "civ", "team": "team1", "playerIndex": 0},
            {"action": "pick", "target": "civ", "team": "team2", "playerIndex": 0},
            {"action": "pick", "target": "map", "team": "team1", "auto": true}
        ],
        "team1Players": [{"name": "Alpha"}],
        "team2Players": [{"name": "Bravo"}]
    })
}

pub fn action(action: &str, role: &str, item_id: Option<&str>) -> ActionRequest {
    ActionRequest {
        action: Some(action.to_string()),
        role: Some(role.to_string()),
        item_id: item_id.map(ToString::to_string),
    }
}

/// Creates a session and marks both teams ready.
pub async fn create_ready_session(service: &DraftService, config: &Value) -> SessionKey {
    let created = service.create_session(config).await.unwrap();
    let key: SessionKey = SessionKey::parse(&created.session_key).unwrap();
    perform(service, &key, "mark-ready", "team1", None).await;
    perform(service, &key, "mark-ready", "team2", None).await;
    key
}

pub async fn perform(
    service: &DraftService,
    key: &SessionKey,
    kind: &str,
    role: &str,
    item_id: Option<&str>,
) -> ActionResponse {
    service
        .perform_action(key, action(kind, role, item_id))
        .await
        .unwrap()
}

/// Always takes the first available item.
pub struct FirstChooser;

impl ItemChooser for FirstChooser {
    fn choose<'a>(&mut self, items: &'a [String]) -> Option<&'a String> {
        items.first()
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{
    FirstChooser, action, create_ready_session, create_standard_config_json, create_test_service,
    perform,
};
use crate::{ActionResponse, ApiError, CreateSessionResponse, DraftService, SessionResponse};
use civdraft::{DraftState, Mutation};
use civdraft_domain::{Role, SessionKey};

async fn read_state(service: &DraftService, key: &SessionKey) -> DraftState {
    service
        .get_session(key, Role::Admin)
        .await
        .unwrap()
        .state
        .unwrap()
}

fn assert_rule(result: Result<ActionResponse, ApiError>, expected: &str) {
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => assert_eq!(rule, expected),
        other => panic!("expected rule '{expected}', got {other:?}"),
    }
}

#[tokio::test]
async fn test_mark_ready_writes_once_per_team() {
    let service: DraftService = create_test_service();
    let created: CreateSessionResponse = service
        .create_session(&create_standard_config_json())
        .await
        .unwrap();
    let key: SessionKey = SessionKey::parse(&created.session_key).unwrap();

    let first: ActionResponse = perform(&service, &key, "mark-ready", "team1", None).await;
    let again: ActionResponse = perform(&service, &key, "mark-ready", "team1", None).await;

    assert!(first.changed);
    assert_eq!(first.version, 2);
    assert!(!again.changed);
    assert_eq!(again.version, 2);
    assert!(read_state(&service, &key).await.is_ready(civdraft_domain::Team::Team1));
}

#[tokio::test]
async fn test_actions_before_both_ready_are_rejected() {
    let service: DraftService = create_test_service();
    let created: CreateSessionResponse = service
        .create_session(&create_standard_config_json())
        .await
        .unwrap();
    let key: SessionKey = SessionKey::parse(&created.session_key).unwrap();
    perform(&service, &key, "mark-ready", "team1", None).await;

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "team1", Some("english")))
        .await;

    assert_rule(result, "draft_not_started");
}

#[tokio::test]
async fn test_full_draft_with_auto_resolve() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;

    perform(&service, &key, "apply-action", "team1", Some("english")).await;
    perform(&service, &key, "apply-action", "team2", Some("french")).await;
    perform(&service, &key, "apply-action", "team1", Some("hre")).await;
    let last_manual: ActionResponse =
        perform(&service, &key, "apply-action", "admin", Some("mongols")).await;
    assert_eq!(last_manual.version, 7);

    let resolved: ActionResponse = service
        .perform_mutation(&key, Role::Team2, Mutation::ResolveAutoStep, &mut FirstChooser)
        .await
        .unwrap();
    assert!(resolved.changed);
    assert_eq!(resolved.version, 8);
    assert_eq!(resolved.picked_id.as_deref(), Some("altai"));

    let state: DraftState = read_state(&service, &key).await;
    assert!(state.completed);
    assert_eq!(state.team1.civ_bans, vec![String::from("english")]);
    assert_eq!(state.team2.civ_picks, vec![String::from("mongols")]);
    assert_eq!(state.team1.map_picks, vec![String::from("altai")]);
}

#[tokio::test]
async fn test_auto_resolve_is_idempotent() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    for (role, item) in [
        ("team1", "english"),
        ("team2", "french"),
        ("team1", "hre"),
        ("team2", "mongols"),
    ] {
        perform(&service, &key, "apply-action", role, Some(item)).await;
    }

    let first: ActionResponse = perform(&service, &key, "auto-resolve", "team1", None).await;
    let second: ActionResponse = perform(&service, &key, "auto-resolve", "team2", None).await;

    assert!(first.changed);
    assert!(first.picked_id.is_some());
    assert!(!second.changed);
    assert_eq!(second.version, first.version);
    assert_eq!(second.picked_id, None);
}

#[tokio::test]
async fn test_auto_resolve_on_manual_step_is_a_no_op() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;

    let response: ActionResponse = perform(&service, &key, "auto-resolve", "team1", None).await;

    assert!(!response.changed);
    assert_eq!(response.version, 3);
    assert_eq!(read_state(&service, &key).await.current_step_index, 0);
}

#[tokio::test]
async fn test_wrong_team_cannot_act() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "team2", Some("english")))
        .await;

    assert_rule(result, "not_your_turn");
    assert_eq!(service.session_version(&key).await.unwrap().version, Some(3));
}

#[tokio::test]
async fn test_spectator_cannot_act() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("mark-ready", "spectator", None))
        .await;

    assert_rule(result, "role_cannot_act");
}

#[tokio::test]
async fn test_unavailable_item_is_rejected() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    perform(&service, &key, "apply-action", "team1", Some("english")).await;

    let banned_again: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "team2", Some("english")))
        .await;
    let not_in_pool: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "team2", Some("rus")))
        .await;

    assert_rule(banned_again, "item_unavailable");
    assert_rule(not_in_pool, "item_unavailable");
}

#[tokio::test]
async fn test_manual_action_on_auto_step_is_rejected() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    for (role, item) in [
        ("team1", "english"),
        ("team2", "french"),
        ("team1", "hre"),
        ("team2", "mongols"),
    ] {
        perform(&service, &key, "apply-action", role, Some(item)).await;
    }

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "team1", Some("altai")))
        .await;

    assert_rule(result, "wrong_step_kind");
}

#[tokio::test]
async fn test_action_on_completed_draft_is_rejected() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    for (role, item) in [
        ("team1", "english"),
        ("team2", "french"),
        ("team1", "hre"),
        ("team2", "mongols"),
    ] {
        perform(&service, &key, "apply-action", role, Some(item)).await;
    }
    perform(&service, &key, "auto-resolve", "admin", None).await;

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("apply-action", "admin", Some("lipany")))
        .await;

    assert_rule(result, "draft_completed");
}

#[tokio::test]
async fn test_admin_undo_restores_previous_state() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    let before: DraftState = read_state(&service, &key).await;
    perform(&service, &key, "apply-action", "team1", Some("english")).await;

    let undone: ActionResponse = perform(&service, &key, "undo", "admin", None).await;

    assert!(undone.changed);
    assert_eq!(undone.version, 5);
    let session: SessionResponse = service.get_session(&key, Role::Admin).await.unwrap();
    assert_eq!(session.state, Some(before));
    assert_eq!(session.history, Some(Vec::new()));

    let nothing_left: ActionResponse = perform(&service, &key, "undo", "admin", None).await;
    assert!(!nothing_left.changed);
    assert_eq!(nothing_left.version, 5);
}

#[tokio::test]
async fn test_team_cannot_undo() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    perform(&service, &key, "apply-action", "team1", Some("english")).await;

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&key, action("undo", "team1", None))
        .await;

    assert_rule(result, "role_cannot_act");
}

#[tokio::test]
async fn test_action_on_missing_session_is_not_found() {
    let service: DraftService = create_test_service();

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&SessionKey::generate(), action("mark-ready", "team1", None))
        .await;

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[tokio::test]
async fn test_malformed_action_is_rejected_before_lookup() {
    let service: DraftService = create_test_service();

    let result: Result<ActionResponse, ApiError> = service
        .perform_action(&SessionKey::generate(), action("submit-hidden-ban", "team1", None))
        .await;

    assert!(matches!(result, Err(ApiError::InvalidInput { ref field, .. }) if field == "itemId"));
}

#[tokio::test]
async fn test_history_is_recorded_for_selections_only() {
    let service: DraftService = create_test_service();
    let key: SessionKey = create_ready_session(&service, &create_standard_config_json()).await;
    perform(&service, &key, "apply-action", "team1", Some("english")).await;
    perform(&service, &key, "apply-action", "team2", Some("french")).await;

    let session: SessionResponse = service.get_session(&key, Role::Admin).await.unwrap();
    let history: Vec<DraftState> = session.history.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].current_step_index, 0);
    assert_eq!(history[1].current_step_index, 1);
}

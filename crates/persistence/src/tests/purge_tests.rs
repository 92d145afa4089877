// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{create_initial_state, test_key};
use crate::data_models::NewSessionRow;
use crate::diesel_schema::draft_sessions;
use crate::{Persistence, PurgeReport};
use civdraft_domain::SessionKey;
use diesel::prelude::*;

fn insert_raw_row(persistence: &mut Persistence, key: &str, state_json: &str, updated_at: i64) {
    diesel::insert_into(draft_sessions::table)
        .values(NewSessionRow {
            session_key: key,
            state_json,
            history_json: "[]",
            version: 1,
            created_at: updated_at,
            updated_at,
        })
        .execute(&mut persistence.conn)
        .unwrap();
}

#[test]
fn test_purge_removes_only_expired_sessions() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let stale: SessionKey = test_key('A');
    let fresh: SessionKey = test_key('B');

    persistence
        .write_session(&stale, &create_initial_state(), &[], 1_000)
        .unwrap();
    persistence
        .write_session(&fresh, &create_initial_state(), &[], 9_000)
        .unwrap();

    let report: PurgeReport = persistence.purge_expired(5_000).unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.corrupt, 0);
    assert!(persistence.read_session(&stale).unwrap().is_none());
    assert!(persistence.read_session(&fresh).unwrap().is_some());
}

#[test]
fn test_purge_removes_corrupt_rows_without_aborting() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let healthy: SessionKey = test_key('A');
    let stale: SessionKey = test_key('C');

    persistence
        .write_session(&healthy, &create_initial_state(), &[], 9_000)
        .unwrap();
    persistence
        .write_session(&stale, &create_initial_state(), &[], 1_000)
        .unwrap();
    insert_raw_row(&mut persistence, "BADKEY2345", "{not json", 9_000);

    let report: PurgeReport = persistence.purge_expired(5_000).unwrap();

    assert_eq!(report, PurgeReport { expired: 1, corrupt: 1 });
    assert_eq!(report.total(), 2);
    assert!(persistence.read_session(&healthy).unwrap().is_some());
}

#[test]
fn test_reading_corrupt_row_is_an_error() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    insert_raw_row(&mut persistence, "BADKEY2345", "[]", 1);
    let key: SessionKey = SessionKey::parse("BADKEY2345").unwrap();

    let result: Result<Option<crate::SessionRecord>, crate::PersistenceError> =
        persistence.read_session(&key);

    assert!(matches!(
        result,
        Err(crate::PersistenceError::CorruptRecord { ref session_key, .. }) if session_key == "BADKEY2345"
    ));
}

#[test]
fn test_purge_on_empty_database() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let report: PurgeReport = persistence.purge_expired(i64::MAX).unwrap();

    assert_eq!(report.total(), 0);
}

//! Call Lifecycle Integration Tests
//!
//! Exercises the state machine against a real SQLite store, including the
//! concurrent-start race and the snooze policy table.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use reveille::core::{CallLifecycle, Error};
use reveille::domain::{CallOutcome, Utterance};
use reveille::store::SqliteCallStore;

fn file_backed_lifecycle(dir: &TempDir) -> CallLifecycle {
    let store = SqliteCallStore::open(dir.path().join("calls.db")).unwrap();
    CallLifecycle::new(Arc::new(store))
}

#[test]
fn test_full_call_scenario() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let record = lifecycle.start_call(1).unwrap();

    lifecycle
        .append_transcript(1, record.id, &[Utterance::user("hello")])
        .unwrap();

    lifecycle
        .end_call(
            1,
            record.id,
            record.started_at + Duration::minutes(5),
            CallOutcome::Success,
            0,
        )
        .unwrap();

    let detail = lifecycle.call_detail(1, record.id).unwrap();
    assert_eq!(detail.outcome, CallOutcome::Success);
    assert_eq!(detail.snooze_count, 0);
    assert_eq!(detail.conversation.len(), 1);
    assert_eq!(detail.conversation[0].text, "hello");
    assert_eq!(
        detail.ended_at.unwrap(),
        record.started_at + Duration::minutes(5)
    );
}

#[test]
fn test_snooze_abuse_forces_fail_snooze() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let record = lifecycle.start_call(1).unwrap();
    lifecycle
        .end_call(1, record.id, Utc::now(), CallOutcome::Success, 4)
        .unwrap();

    let detail = lifecycle.call_detail(1, record.id).unwrap();
    assert_eq!(detail.outcome, CallOutcome::FailSnooze);
    assert_eq!(detail.snooze_count, 3);
}

#[test]
fn test_snooze_clamp_table() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    // (requested, expected clamped, expected outcome for a SUCCESS request)
    let cases = [
        (-5, 0, CallOutcome::Success),
        (0, 0, CallOutcome::Success),
        (2, 2, CallOutcome::Success),
        (3, 3, CallOutcome::FailSnooze),
        (10, 3, CallOutcome::FailSnooze),
    ];

    for (requested, clamped, outcome) in cases {
        let record = lifecycle.start_call(1).unwrap();
        lifecycle
            .end_call(1, record.id, Utc::now(), CallOutcome::Success, requested)
            .unwrap();

        let detail = lifecycle.call_detail(1, record.id).unwrap();
        assert_eq!(detail.snooze_count, clamped, "requested {}", requested);
        assert_eq!(detail.outcome, outcome, "requested {}", requested);
    }
}

#[test]
fn test_concurrent_start_only_one_wins() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteCallStore::open(dir.path().join("calls.db")).unwrap());
    let lifecycle = Arc::new(CallLifecycle::new(store));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let lifecycle = Arc::clone(&lifecycle);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                lifecycle.start_call(1)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(Error::Conflict(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
}

#[test]
fn test_concurrent_end_second_sees_invalid_state() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteCallStore::open(dir.path().join("calls.db")).unwrap());
    let lifecycle = Arc::new(CallLifecycle::new(store));

    let record = lifecycle.start_call(1).unwrap();
    let call_id = record.id;

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let lifecycle = Arc::clone(&lifecycle);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                lifecycle.end_call(1, call_id, Utc::now(), CallOutcome::Success, 0)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let invalid = results
        .iter()
        .filter(|r| matches!(r, Err(Error::InvalidState(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(invalid, 1);
}

#[test]
fn test_closed_call_rejects_mutation() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let record = lifecycle.start_call(1).unwrap();
    lifecycle
        .end_call(1, record.id, Utc::now(), CallOutcome::FailNoTalk, 1)
        .unwrap();

    assert!(matches!(
        lifecycle.append_transcript(1, record.id, &[Utterance::user("x")]),
        Err(Error::InvalidState(_))
    ));
    assert!(matches!(
        lifecycle.end_call(1, record.id, Utc::now(), CallOutcome::Success, 0),
        Err(Error::InvalidState(_))
    ));
}

#[test]
fn test_transcript_full_replace_semantics() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let record = lifecycle.start_call(1).unwrap();
    lifecycle
        .append_transcript(1, record.id, &[Utterance::user("first")])
        .unwrap();

    // The client resends its accumulated view; the payload is replaced
    lifecycle
        .append_transcript(
            1,
            record.id,
            &[Utterance::user("first"), Utterance::assistant("second")],
        )
        .unwrap();

    let detail = lifecycle.call_detail(1, record.id).unwrap();
    assert_eq!(detail.conversation.len(), 2);
    assert_eq!(detail.conversation[1].text, "second");
}

#[test]
fn test_wrong_user_cannot_touch_call() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let record = lifecycle.start_call(1).unwrap();

    assert!(matches!(
        lifecycle.call_detail(2, record.id),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        lifecycle.end_call(2, record.id, Utc::now(), CallOutcome::Success, 0),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_unknown_call_errors() {
    let dir = TempDir::new().unwrap();
    let lifecycle = file_backed_lifecycle(&dir);

    let bogus = Uuid::new_v4();
    assert!(matches!(
        lifecycle.append_transcript(1, bogus, &[Utterance::user("x")]),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        lifecycle.call_detail(1, bogus),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_record_survives_reopen_of_store() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("calls.db");
    let call_id;

    {
        let store = SqliteCallStore::open(&db_path).unwrap();
        let lifecycle = CallLifecycle::new(Arc::new(store));
        let record = lifecycle.start_call(9).unwrap();
        call_id = record.id;
        lifecycle
            .append_transcript(9, call_id, &[Utterance::assistant("wake up")])
            .unwrap();
        lifecycle
            .end_call(9, call_id, Utc::now(), CallOutcome::Success, 1)
            .unwrap();
    }

    let store = SqliteCallStore::open(&db_path).unwrap();
    let lifecycle = CallLifecycle::new(Arc::new(store));
    let detail = lifecycle.call_detail(9, call_id).unwrap();
    assert_eq!(detail.outcome, CallOutcome::Success);
    assert_eq!(detail.snooze_count, 1);
    assert_eq!(detail.conversation.len(), 1);
}

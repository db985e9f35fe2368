//! Integration tests: drive the scheduler through its public API with a
//! session type defined outside the crate.

mod common;

use std::time::Duration;

use common::paths::{CountingUpstream, FixedPath};
use mpsched_core::config::SchedulerConfig;
use mpsched_core::scheduler::{SendOutcome, SinglePathOutcome};
use mpsched_core::types::pieces;
use mpsched_core::{HandlerRef, MultipathScheduler, PieceId, ScheduleError, SessionId, SessionMap};

fn paths(list: Vec<FixedPath>) -> SessionMap<FixedPath> {
    let mut map = SessionMap::new();
    for p in list {
        map.insert(p);
    }
    map
}

fn started(table: &SessionMap<FixedPath>) -> MultipathScheduler {
    let mut sched = MultipathScheduler::new(SchedulerConfig::default());
    for p in table.iter() {
        sched.on_session_created(p.id);
    }
    sched
}

#[test]
fn worked_example_two_paths() {
    let mut table = paths(vec![FixedPath::new(1, 10, 4), FixedPath::new(2, 30, 2)]);
    let mut sched = started(&table);
    sched.add_pieces(pieces(0..10));

    sched.run_global_pass(&mut table);

    assert_eq!(table.get(SessionId(1)).unwrap().requested, pieces([0, 1, 2, 3]));
    assert_eq!(table.get(SessionId(2)).unwrap().requested, pieces([8, 9]));
    assert_eq!(sched.free_pool().collect::<Vec<_>>(), pieces([4, 5, 6, 7]));
}

#[test]
fn lifecycle_and_backpressure_end_to_end() {
    let upstream = CountingUpstream::shared();
    let mut table = paths(vec![FixedPath::new(1, 10, 3), FixedPath::new(2, 80, 3)]);
    let mut sched = started(&table);
    sched.start(HandlerRef::new(&upstream));

    // Empty pool: the pass only asks upstream.
    let summary = sched.run_global_pass(&mut table);
    assert_eq!(summary.deficit, 6);
    assert_eq!(upstream.asks(), vec![6]);

    sched.add_pieces(pieces(0..6));
    let summary = sched.run_global_pass(&mut table);
    assert_eq!(summary.total_assigned(), 6);
    assert_eq!(upstream.asks(), vec![6], "no request when supply covers the windows");

    // Path 2 refuses its next batch; the pieces come back for anyone.
    table.get_mut(SessionId(2)).unwrap().accept = false;
    sched.add_pieces(pieces(6..9));
    let outcome = sched.run_single_path_pass(&mut table, SessionId(2)).unwrap();
    assert_eq!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 3,
            send: SendOutcome::Failed(3)
        }
    );
    assert_eq!(sched.free_pool().collect::<Vec<_>>(), pieces(6..9));

    // Path 2 goes away; a timeout for one of its in-flight pieces is recovered.
    let in_flight: Vec<PieceId> = table.get(SessionId(2)).unwrap().requested.clone();
    sched.on_pieces_timed_out(SessionId(2), &in_flight[..1]);
    sched.on_session_destroyed(SessionId(2));
    table.remove(SessionId(2));

    let summary = sched.run_global_pass(&mut table);
    assert_eq!(summary.requeued, 1);
    assert!(table
        .get(SessionId(1))
        .unwrap()
        .requested
        .contains(&in_flight[0]));

    sched.stop();
    assert!(sched.tracked_sessions().is_empty());
    assert_eq!(
        sched.run_single_path_pass(&mut table, SessionId(1)),
        Err(ScheduleError::UnknownSession(SessionId(1)))
    );
}

#[test]
fn receipt_notification_refills_the_reporting_path() {
    let mut table = paths(vec![FixedPath::new(1, 10, 2)]);
    let mut sched = started(&table);
    sched.add_pieces(pieces(0..4));
    sched
        .on_data_received(&mut table, SessionId(1), 1, PieceId(99), Duration::from_millis(3))
        .unwrap();
    assert_eq!(table.get(SessionId(1)).unwrap().requested, pieces([0, 1]));
}

#[test]
fn snapshot_serializes_to_json() {
    let mut table = paths(vec![FixedPath::new(1, 10, 0)]);
    let mut sched = started(&table);
    sched.add_pieces(pieces(0..2));
    sched.on_pieces_timed_out(SessionId(1), &pieces([5]));
    sched.run_global_pass(&mut table);
    let json = serde_json::to_value(sched.snapshot()).unwrap();
    assert_eq!(json["free"], serde_json::json!([0, 1, 5]));
    assert_eq!(json["lost"], serde_json::json!([]));
}

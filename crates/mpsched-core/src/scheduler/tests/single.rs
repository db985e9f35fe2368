use super::*;
use crate::scheduler::{ScheduleError, SendOutcome, SinglePathOutcome};

#[test]
fn unknown_session_is_an_error() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 4)], 0..4);
    assert_eq!(
        sched.run_single_path_pass(&mut t, sid(9)),
        Err(ScheduleError::UnknownSession(sid(9)))
    );
    assert_eq!(sched.free_len(), 4);
}

#[test]
fn session_in_table_but_never_created_is_unknown() {
    let mut sched = MultipathScheduler::new(SchedulerConfig::default());
    let mut t = table(vec![MockSession::new(1, 10, 4)]);
    sched.add_pieces(pieces(0..4));
    assert_eq!(
        sched.run_single_path_pass(&mut t, sid(1)),
        Err(ScheduleError::UnknownSession(sid(1)))
    );
    assert!(t.get(sid(1)).map(|s| s.sent.is_empty()).unwrap_or(false));
}

#[test]
fn zero_capacity_is_saturated_not_an_error() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 0)], 0..0);
    let handler = with_handler(&mut sched);
    assert_eq!(
        sched.run_single_path_pass(&mut t, sid(1)),
        Ok(SinglePathOutcome::Saturated)
    );
    assert!(handler.requests().is_empty());
}

#[test]
fn fills_window_from_front_of_pool_and_sends() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 3)], 0..10);
    let handler = with_handler(&mut sched);
    let outcome = sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert_eq!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 3,
            send: SendOutcome::Sent(3)
        }
    );
    assert_eq!(t.get(sid(1)).unwrap().sent_flat(), pieces([0, 1, 2]));
    assert_eq!(free(&sched), pieces(3..10));
    assert!(handler.requests().is_empty());
    assert_eq!(sched.stats().pieces_sent, 3);
}

#[test]
fn short_pool_requests_the_deficit_and_uses_what_is_there() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 5)], 0..2);
    let handler = with_handler(&mut sched);
    let outcome = sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert_eq!(handler.requests(), vec![3]);
    assert_eq!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 2,
            send: SendOutcome::Sent(2)
        }
    );
    assert_eq!(sched.stats().replenish_requests, 1);
    assert_eq!(sched.stats().pieces_requested, 3);
}

#[test]
fn expired_handler_does_not_stop_scheduling() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 5)], 0..2);
    let handler = with_handler(&mut sched);
    drop(handler);
    let outcome = sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert!(matches!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 2,
            send: SendOutcome::Sent(2)
        }
    ));
    assert_eq!(sched.stats().replenish_requests, 0);
}

#[test]
fn failed_send_returns_exactly_the_batch_to_the_pool() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 3).failing()], 0..10);
    let outcome = sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert_eq!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 3,
            send: SendOutcome::Failed(3)
        }
    );
    assert_eq!(free(&sched), pieces(0..10));
    assert_eq!(sched.assigned(sid(1)), Some(vec![]));
    assert_eq!(sched.lost().count(), 0);
    assert_eq!(sched.stats().send_failures, 1);
    assert_eq!(sched.stats().pieces_returned, 3);
    assert_partition(&sched);
}

#[test]
fn pending_pieces_go_out_before_new_ones() {
    // First pass: assign 0..4 but only 1 fits at send time.
    let s = MockSession::new(1, 10, 4).with_capacities([4, 1, 2, 2]);
    let (mut sched, mut t) = setup(vec![s], 0..10);
    sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert_eq!(sched.assigned(sid(1)), Some(pieces([1, 2, 3])));

    // Second pass: two more assigned (4, 5), send takes the two lowest pending.
    sched.run_single_path_pass(&mut t, sid(1)).unwrap();
    assert_eq!(t.get(sid(1)).unwrap().sent, vec![pieces([0]), pieces([1, 2])]);
    assert_eq!(sched.assigned(sid(1)), Some(pieces([3, 4, 5])));
    assert_partition(&sched);
}

#[test]
fn data_receipt_triggers_a_single_path_pass() {
    let (mut sched, mut t) = setup(vec![MockSession::new(1, 10, 2)], 0..5);
    let outcome = sched
        .on_data_received(&mut t, sid(1), 17, PieceId(100), std::time::Duration::from_millis(5))
        .unwrap();
    assert_eq!(
        outcome,
        SinglePathOutcome::Scheduled {
            assigned: 2,
            send: SendOutcome::Sent(2)
        }
    );
    assert_eq!(sched.stats().single_passes, 1);
    assert!(sched
        .on_data_received(&mut t, sid(4), 18, PieceId(101), std::time::Duration::ZERO)
        .is_err());
}

//! Friend request state machine through the logbook.

use liftlog::social::RequestStatus;
use liftlog::{Decision, ErrorKind, Logbook};
use uuid::Uuid;

fn users(logbook: &mut Logbook) -> (Uuid, Uuid) {
    let a = logbook.register_user("a@example.com", "anna", "Anna").unwrap().id;
    let b = logbook.register_user("b@example.com", "ben", "Ben").unwrap().id;
    (a, b)
}

#[test]
fn test_crossing_requests_conflict() {
    let mut logbook = Logbook::in_memory().unwrap();
    let (a, b) = users(&mut logbook);

    logbook.send_friend_request(a, "ben").unwrap();
    let err = logbook.send_friend_request(b, "anna").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(logbook.list_incoming_requests(b).unwrap().len(), 1);
    assert!(logbook.list_incoming_requests(a).unwrap().is_empty());
}

#[test]
fn test_accept_creates_one_symmetric_friendship() {
    let mut logbook = Logbook::in_memory().unwrap();
    let (a, b) = users(&mut logbook);

    let request = logbook.send_friend_request(a, "ben").unwrap();
    let accepted = logbook
        .respond_friend_request(request.id, b, Decision::Accept)
        .unwrap();
    assert_eq!(accepted.status, RequestStatus::Accepted);

    let of_a = logbook.list_friends(a).unwrap();
    let of_b = logbook.list_friends(b).unwrap();
    assert_eq!(of_a.len(), 1);
    assert_eq!(of_a[0].id, b);
    assert_eq!(of_b.len(), 1);
    assert_eq!(of_b[0].id, a);

    let err = logbook
        .respond_friend_request(request.id, b, Decision::Accept)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let rows: i64 = logbook
        .database()
        .connection()
        .query_row("SELECT COUNT(*) FROM friendships", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_reject_then_retry() {
    let mut logbook = Logbook::in_memory().unwrap();
    let (a, b) = users(&mut logbook);

    let request = logbook.send_friend_request(a, "ben").unwrap();
    logbook
        .respond_friend_request(request.id, b, Decision::Reject)
        .unwrap();
    assert!(logbook.list_friends(a).unwrap().is_empty());
    assert!(logbook.list_outgoing_requests(a).unwrap().is_empty());

    let retry = logbook.send_friend_request(a, "ben").unwrap();
    assert_eq!(retry.status, RequestStatus::Pending);
    assert_ne!(retry.id, request.id);
}

#[test]
fn test_sender_cannot_accept_own_request() {
    let mut logbook = Logbook::in_memory().unwrap();
    let (a, _) = users(&mut logbook);

    let request = logbook.send_friend_request(a, "ben").unwrap();
    let err = logbook
        .respond_friend_request(request.id, a, Decision::Accept)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[test]
fn test_self_request_conflicts() {
    let mut logbook = Logbook::in_memory().unwrap();
    let (a, _) = users(&mut logbook);

    let err = logbook.send_friend_request(a, "anna").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

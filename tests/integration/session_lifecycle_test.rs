//! Session start, logging, finish and cancel through the logbook.

use liftlog::sessions::{SessionStatus, SetDraft};
use liftlog::ErrorKind;

use crate::common::{date, Gym};

#[test]
fn test_session_snapshots_survive_renames() {
    let mut gym = Gym::new();
    let session = gym
        .logbook
        .start_session(gym.user, gym.template, Some(date(3)))
        .unwrap();

    gym.logbook
        .update_template(gym.user, gym.template, Some("Heavy day"), None)
        .unwrap();

    let stored = gym.logbook.get_session(gym.user, session.id).unwrap();
    assert_eq!(stored.session.template_name, "Day 1");
    assert_eq!(stored.session.program_name, "Base");
}

#[test]
fn test_cancel_discards_sets_and_records() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let session = gym
        .logbook
        .start_session(gym.user, gym.template, Some(date(1)))
        .unwrap();
    gym.logbook
        .log_set(gym.user, session.id, &SetDraft::new(squat, 150.0, 1))
        .unwrap();

    let cancelled = gym.logbook.cancel_session(gym.user, session.id).unwrap();
    assert_eq!(cancelled.session.status, SessionStatus::Cancelled);
    assert!(cancelled.set_logs.is_empty());
    assert!(gym
        .logbook
        .list_personal_bests(gym.user, None, None)
        .unwrap()
        .is_empty());

    let err = gym.logbook.finish_session(gym.user, session.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_refinish_conflicts() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    gym.train(1, &[(squat, 100.0, 5)]);
    let session = gym.logbook.list_sessions(gym.user, None).unwrap().remove(0);
    assert_eq!(session.session.status, SessionStatus::Done);

    let err = gym
        .logbook
        .finish_session(gym.user, session.session.id)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_delete_and_clear_sessions() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    gym.train(1, &[(squat, 100.0, 5)]);
    let open = gym
        .logbook
        .start_session(gym.user, gym.template, Some(date(2)))
        .unwrap();
    gym.logbook
        .log_set(gym.user, open.id, &SetDraft::new(squat, 60.0, 10))
        .unwrap();

    assert_eq!(gym.logbook.clear_active_sessions(gym.user).unwrap(), 1);
    let remaining = gym.logbook.list_sessions(gym.user, None).unwrap();
    assert_eq!(remaining.len(), 1);

    let report = gym
        .logbook
        .delete_session(gym.user, remaining[0].session.id)
        .unwrap();
    assert_eq!(report.set_logs, 1);
    assert!(gym.logbook.list_sessions(gym.user, None).unwrap().is_empty());

    // Records outlive the session they came from
    assert_eq!(
        gym.logbook.list_personal_bests(gym.user, None, None).unwrap().len(),
        3
    );
}

#[test]
fn test_log_set_requires_own_exercise() {
    let mut gym = Gym::new();
    let other = gym.register("other");
    let theirs = gym
        .logbook
        .create_exercise(other, &liftlog::exercises::ExerciseDraft::named("Squat"))
        .unwrap();
    let session = gym
        .logbook
        .start_session(gym.user, gym.template, None)
        .unwrap();

    let err = gym
        .logbook
        .log_set(gym.user, session.id, &SetDraft::new(theirs.id, 100.0, 5))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
}

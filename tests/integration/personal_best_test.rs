//! Personal-best derivation through the logbook.

use liftlog::programs::ProgramDraft;
use liftlog::sessions::SetDraft;
use liftlog::{ErrorKind, PbKind};

use crate::common::{date, Gym};

#[test]
fn test_single_set_produces_three_records() {
    let mut gym = Gym::new();
    let bench = gym.exercise_in(gym.user, gym.template, "Bench press");

    let records = gym.train(1, &[(bench, 100.0, 5)]);
    assert_eq!(records.len(), 3);

    let by_kind = |kind: PbKind| records.iter().find(|pb| pb.kind == kind).unwrap();

    let est = by_kind(PbKind::Est1Rm);
    assert!((est.value - 116.666).abs() < 0.01);
    assert_eq!(est.label, "1RM (est)");

    let mwr = by_kind(PbKind::MaxWeightReps);
    assert_eq!(mwr.value, 100.0);
    assert_eq!(mwr.reps, 5);
    assert_eq!(mwr.label, "Max weight for 5 reps");

    let volume = by_kind(PbKind::MaxVolume);
    assert_eq!(volume.value, 500.0);
    assert_eq!(volume.label, "Max volume");
    assert_eq!(volume.date, date(1));
}

#[test]
fn test_rep_counts_do_not_overwrite_each_other() {
    let mut gym = Gym::new();
    let bench = gym.exercise_in(gym.user, gym.template, "Bench press");

    gym.train(1, &[(bench, 100.0, 5)]);
    gym.train(2, &[(bench, 90.0, 8)]);

    let mwr = gym
        .logbook
        .list_personal_bests(gym.user, Some(bench), None)
        .unwrap()
        .into_iter()
        .filter(|pb| pb.kind == PbKind::MaxWeightReps)
        .collect::<Vec<_>>();
    assert_eq!(mwr.len(), 2);

    let eight = gym
        .logbook
        .list_personal_bests(gym.user, Some(bench), Some(8))
        .unwrap();
    assert!(eight
        .iter()
        .any(|pb| pb.kind == PbKind::MaxWeightReps && pb.value == 90.0));
}

#[test]
fn test_values_never_decrease() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let loads = [120.0, 100.0, 130.0, 125.0, 130.0, 90.0];

    let mut best_so_far = 0.0_f64;
    for (i, weight) in loads.iter().enumerate() {
        gym.train(i as u32 + 1, &[(squat, *weight, 3)]);
        best_so_far = best_so_far.max(*weight);

        let current = gym
            .logbook
            .list_personal_bests(gym.user, Some(squat), Some(3))
            .unwrap()
            .into_iter()
            .find(|pb| pb.kind == PbKind::MaxWeightReps)
            .unwrap();
        assert_eq!(current.value, best_so_far);
    }
}

#[test]
fn test_tie_keeps_first_record() {
    let mut gym = Gym::new();
    let row = gym.exercise_in(gym.user, gym.template, "Row");

    gym.train(1, &[(row, 80.0, 10)]);
    let second = gym.train(9, &[(row, 80.0, 10)]);
    assert!(second.is_empty());

    let records = gym.logbook.list_personal_bests(gym.user, Some(row), None).unwrap();
    assert!(records.iter().all(|pb| pb.date == date(1)));
}

#[test]
fn test_later_set_in_same_session_supersedes() {
    let mut gym = Gym::new();
    let press = gym.exercise_in(gym.user, gym.template, "Overhead press");

    let records = gym.train(1, &[(press, 50.0, 5), (press, 55.0, 5), (press, 52.5, 5)]);
    assert_eq!(records.len(), 3);

    let mwr = records
        .iter()
        .find(|pb| pb.kind == PbKind::MaxWeightReps)
        .unwrap();
    assert_eq!(mwr.value, 55.0);
}

#[test]
fn test_improvement_keeps_sharing_flag() {
    let mut gym = Gym::new();
    let deadlift = gym.exercise_in(gym.user, gym.template, "Deadlift");

    let first = gym.train(1, &[(deadlift, 180.0, 1)]);
    let volume = first.iter().find(|pb| pb.kind == PbKind::MaxVolume).unwrap();
    gym.logbook
        .publish_personal_best(gym.user, volume.id, true)
        .unwrap();

    let improved = gym.train(2, &[(deadlift, 190.0, 1)]);
    let volume_after = improved
        .iter()
        .find(|pb| pb.kind == PbKind::MaxVolume)
        .unwrap();
    assert_eq!(volume_after.id, volume.id);
    assert_eq!(volume_after.value, 190.0);
    assert!(volume_after.is_public);
}

#[test]
fn test_remerging_same_sets_changes_nothing() {
    let mut gym = Gym::new();
    let curl = gym.exercise_in(gym.user, gym.template, "Curl");
    gym.train(1, &[(curl, 20.0, 12)]);

    let session = gym.logbook.list_sessions(gym.user, Some(1)).unwrap().remove(0);
    let again = gym
        .logbook
        .derive_and_merge_personal_bests(gym.user, &session.session, &session.set_logs)
        .unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_merge_rejects_sets_outside_a_finished_session() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");

    let bob = gym.register("bob");
    let bob_program = gym
        .logbook
        .create_program(bob, &ProgramDraft::named("Bob's plan"))
        .unwrap()
        .id;
    let bob_template = gym
        .logbook
        .create_template(bob, bob_program, "Heavy")
        .unwrap()
        .id;
    let deadlift = gym.exercise_in(bob, bob_template, "Deadlift");
    let bob_session = gym
        .logbook
        .start_session(bob, bob_template, Some(date(2)))
        .unwrap();
    let bob_set = gym
        .logbook
        .log_set(bob, bob_session.id, &SetDraft::new(deadlift, 200.0, 5))
        .unwrap();

    let open = gym
        .logbook
        .start_session(gym.user, gym.template, Some(date(3)))
        .unwrap();
    let err = gym
        .logbook
        .derive_and_merge_personal_bests(gym.user, &open, &[bob_set.clone()])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    gym.logbook
        .log_set(gym.user, open.id, &SetDraft::new(squat, 120.0, 3))
        .unwrap();
    let finished = gym.logbook.finish_session(gym.user, open.id).unwrap();
    let err = gym
        .logbook
        .derive_and_merge_personal_bests(gym.user, &finished.session, &[bob_set])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let records = gym
        .logbook
        .list_personal_bests(gym.user, Some(deadlift), None)
        .unwrap();
    assert!(records.is_empty());
}

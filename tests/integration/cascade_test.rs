//! Cascading delete, copy and fork through the logbook.

use liftlog::exercises::ExerciseDraft;
use liftlog::programs::{ProgramStatus, RowDraft, Visibility};
use liftlog::{CopyOverrides, ErrorKind};
use uuid::Uuid;

use crate::common::Gym;

#[test]
fn test_delete_program_leaves_unrelated_records() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let bench = gym.exercise_in(gym.user, gym.template, "Bench");
    gym.train(1, &[(squat, 100.0, 5), (bench, 80.0, 5)]);
    gym.train(2, &[(squat, 105.0, 5)]);
    let before = gym.logbook.list_personal_bests(gym.user, None, None).unwrap();

    let report = gym.logbook.cascade_delete_program(gym.user, gym.program).unwrap();
    assert_eq!(report.templates, 1);
    assert_eq!(report.rows, 2);
    assert_eq!(report.sessions, 2);
    assert_eq!(report.set_logs, 3);
    assert_eq!(report.total(), 8);

    assert!(gym.logbook.list_programs(gym.user).unwrap().is_empty());
    assert!(gym.logbook.list_templates(gym.user, None).unwrap().is_empty());
    assert!(gym.logbook.list_sessions(gym.user, None).unwrap().is_empty());
    assert_eq!(
        gym.logbook.list_personal_bests(gym.user, None, None).unwrap(),
        before
    );
}

#[test]
fn test_delete_only_touches_target_program() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let other = gym
        .logbook
        .copy_program(gym.user, gym.program, &CopyOverrides::default())
        .unwrap();
    gym.train(1, &[(squat, 100.0, 5)]);

    gym.logbook
        .cascade_delete_program(gym.user, other.program.id)
        .unwrap();

    let programs = gym.logbook.list_programs(gym.user).unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0].id, gym.program);
    assert_eq!(gym.logbook.list_sessions(gym.user, None).unwrap().len(), 1);
}

#[test]
fn test_failed_cascade_changes_nothing() {
    let mut gym = Gym::new();
    gym.exercise_in(gym.user, gym.template, "Squat");
    let stranger = gym.register("stranger");

    let err = gym
        .logbook
        .cascade_delete_program(stranger, gym.program)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(gym.logbook.list_templates(gym.user, None).unwrap()[0].rows.len(), 1);

    let err = gym
        .logbook
        .cascade_delete_program(gym.user, Uuid::new_v4())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_copy_is_new_version_sharing_exercises() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    gym.logbook
        .update_program(
            gym.user,
            gym.program,
            &liftlog::programs::ProgramPatch {
                status: Some(ProgramStatus::Archived),
                ..Default::default()
            },
        )
        .unwrap();

    let copy = gym
        .logbook
        .copy_program(gym.user, gym.program, &CopyOverrides::default())
        .unwrap();
    assert_eq!(copy.program.name, "Base (copy)");
    assert_eq!(copy.program.version, 2);
    assert_eq!(copy.program.status, ProgramStatus::Active);
    assert_eq!(copy.templates[0].rows[0].exercise_id, squat);
    assert_ne!(copy.templates[0].template.id, gym.template);
    assert_eq!(gym.logbook.list_exercises(gym.user).unwrap().len(), 1);
}

#[test]
fn test_fork_remaps_every_exercise() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let bench = gym.exercise_in(gym.user, gym.template, "Bench");
    let day2 = gym.logbook.create_template(gym.user, gym.program, "Day 2").unwrap().id;
    for exercise in [squat, bench, squat] {
        gym.logbook
            .add_row(gym.user, day2, &RowDraft::for_exercise(exercise))
            .unwrap();
    }
    gym.logbook.publish_program(gym.user, gym.program, true).unwrap();

    // 5 rows referencing 2 distinct exercises
    let forker = gym.register("forker");
    let fork = gym.logbook.fork_program(forker, gym.program).unwrap();

    let copies = gym.logbook.list_exercises(forker).unwrap();
    assert_eq!(copies.len(), 2);
    let copy_ids: Vec<Uuid> = copies.iter().map(|e| e.id).collect();

    assert_eq!(fork.row_count(), 5);
    for row in fork.templates.iter().flat_map(|t| t.rows.iter()) {
        assert!(copy_ids.contains(&row.exercise_id));
        assert_ne!(row.exercise_id, squat);
        assert_ne!(row.exercise_id, bench);
    }

    assert_eq!(fork.program.owner_id, forker);
    assert_eq!(fork.program.version, 1);
    assert_eq!(fork.program.visibility, Visibility::Private);
    assert!(!fork.program.is_public());
    assert!(gym.logbook.audit_template_rows(forker).unwrap().is_empty());

    // The source is untouched
    assert_eq!(gym.logbook.list_exercises(gym.user).unwrap().len(), 2);
}

#[test]
fn test_fork_private_program_by_stranger_rejected() {
    let mut gym = Gym::new();
    gym.exercise_in(gym.user, gym.template, "Squat");
    let stranger = gym.register("stranger");

    let err = gym.logbook.fork_program(stranger, gym.program).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(gym.logbook.list_exercises(stranger).unwrap().is_empty());
    assert!(gym.logbook.list_programs(stranger).unwrap().is_empty());
}

#[test]
fn test_delete_exercise_cascades() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let lunge = gym.exercise_in(gym.user, gym.template, "Lunge");
    gym.train(1, &[(squat, 100.0, 5), (lunge, 40.0, 10)]);

    let report = gym.logbook.delete_exercise(gym.user, lunge).unwrap();
    assert_eq!(report.rows, 1);
    assert_eq!(report.set_logs, 1);
    assert_eq!(report.personal_bests, 3);

    let remaining = gym.logbook.list_templates(gym.user, None).unwrap();
    assert_eq!(remaining[0].rows.len(), 1);
    assert!(gym
        .logbook
        .list_personal_bests(gym.user, Some(lunge), None)
        .unwrap()
        .is_empty());
    let err = gym.logbook.get_exercise(gym.user, lunge).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_exercise_rename_collision() {
    let mut gym = Gym::new();
    gym.logbook
        .create_exercise(gym.user, &ExerciseDraft::named("Squat"))
        .unwrap();
    let front = gym
        .logbook
        .create_exercise(gym.user, &ExerciseDraft::named("Front squat"))
        .unwrap();

    let patch = liftlog::exercises::ExercisePatch {
        name: Some("SQUAT".to_string()),
        ..Default::default()
    };
    let err = gym
        .logbook
        .update_exercise(gym.user, front.id, &patch)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

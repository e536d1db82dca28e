//! Public programs and personal bests through the logbook.

use liftlog::ErrorKind;

use crate::common::Gym;

#[test]
fn test_program_tree_for_visitors() {
    let mut gym = Gym::new();
    gym.exercise_in(gym.user, gym.template, "Squat");
    let visitor = gym.register("visitor");

    assert!(gym.logbook.list_user_programs(visitor, "lifter").unwrap().is_empty());
    let err = gym
        .logbook
        .program_tree(visitor, "lifter", gym.program)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authorization);

    gym.logbook.publish_program(gym.user, gym.program, true).unwrap();
    let listed = gym.logbook.list_user_programs(visitor, "lifter").unwrap();
    assert_eq!(listed.len(), 1);

    let tree = gym
        .logbook
        .program_tree(visitor, "lifter", gym.program)
        .unwrap();
    let row = &tree.templates[0].rows[0];
    assert_eq!(row.exercise.as_ref().unwrap().name, "Squat");

    let err = gym
        .logbook
        .program_tree(visitor, "visitor", gym.program)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_visitors_see_only_shared_records() {
    let mut gym = Gym::new();
    let squat = gym.exercise_in(gym.user, gym.template, "Squat");
    let records = gym.train(1, &[(squat, 100.0, 5)]);
    let visitor = gym.register("visitor");

    assert_eq!(
        gym.logbook
            .list_user_personal_bests(gym.user, "lifter", None)
            .unwrap()
            .len(),
        3
    );
    assert!(gym
        .logbook
        .list_user_personal_bests(visitor, "lifter", None)
        .unwrap()
        .is_empty());

    gym.logbook
        .publish_personal_best(gym.user, records[0].id, true)
        .unwrap();
    let shared = gym
        .logbook
        .list_user_personal_bests(visitor, "lifter", Some(squat))
        .unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, records[0].id);
}

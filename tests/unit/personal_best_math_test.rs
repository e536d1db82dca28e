//! Unit tests for personal-best candidate math.

use liftlog::records::types::candidates_for;
use liftlog::records::{estimate_one_rm, PbKind};
use liftlog::sessions::SetLog;
use uuid::Uuid;

fn set(weight: f64, reps: u32) -> SetLog {
    SetLog {
        id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        exercise_id: Uuid::new_v4(),
        set_number: 1,
        weight,
        reps,
        rpe: 8.0,
        comment: String::new(),
    }
}

#[test]
fn test_epley_estimate() {
    assert!((estimate_one_rm(100.0, 5) - 116.6667).abs() < 1e-3);
    assert_eq!(estimate_one_rm(100.0, 0), 100.0);
    assert_eq!(estimate_one_rm(0.0, 10), 0.0);
}

#[test]
fn test_candidates_in_merge_order() {
    let candidates = candidates_for(&set(90.0, 8));
    let kinds: Vec<PbKind> = candidates.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, PbKind::ALL.to_vec());

    assert_eq!(candidates[1].value, 90.0);
    assert_eq!(candidates[1].label, "Max weight for 8 reps");
    assert_eq!(candidates[2].value, 720.0);
}

#[test]
fn test_rep_key_only_for_rep_records() {
    assert_eq!(PbKind::MaxWeightReps.rep_key(5), 5);
    assert_eq!(PbKind::Est1Rm.rep_key(5), PbKind::Est1Rm.rep_key(8));
    assert_eq!(PbKind::MaxVolume.rep_key(5), -1);
}

#[test]
fn test_kind_text_round_trip() {
    for kind in PbKind::ALL {
        assert_eq!(kind.to_string().parse::<PbKind>().unwrap(), kind);
    }
    assert!("best_ever".parse::<PbKind>().is_err());
}

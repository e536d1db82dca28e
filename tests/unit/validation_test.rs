//! Unit tests for input normalization and validation helpers.

use liftlog::exercises::types::normalize_name;
use liftlog::social::canonical_pair;
use liftlog::users::types::is_valid_username;
use uuid::Uuid;

#[test]
fn test_username_rules() {
    assert!(is_valid_username("abc"));
    assert!(is_valid_username("lift_er_99"));
    assert!(!is_valid_username("ab"));
    assert!(!is_valid_username(&"x".repeat(31)));
    assert!(!is_valid_username("has space"));
    assert!(!is_valid_username("dash-ed"));
}

#[test]
fn test_exercise_name_normalization() {
    assert_eq!(normalize_name("  deadlift"), "Deadlift");
    assert_eq!(normalize_name("ärmhävning"), "Ärmhävning");
    assert_eq!(normalize_name("   "), "");
}

#[test]
fn test_canonical_pair_orders_ids() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let (low, high) = canonical_pair(b, a);
    assert!(low <= high);
    assert_eq!((low, high), canonical_pair(a, b));
}

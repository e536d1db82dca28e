//! Exercise type definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An exercise in one user's catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Unique per owner, compared case-insensitively
    pub name: String,
    pub muscle_group: String,
    pub exercise_type: String,
    pub equipment: String,
    pub notes: String,
}

/// Fields for a new exercise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseDraft {
    pub name: String,
    #[serde(default)]
    pub muscle_group: String,
    #[serde(default)]
    pub exercise_type: String,
    #[serde(default)]
    pub equipment: String,
    #[serde(default)]
    pub notes: String,
}

impl ExerciseDraft {
    /// Draft with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExercisePatch {
    pub name: Option<String>,
    pub muscle_group: Option<String>,
    pub exercise_type: Option<String>,
    pub equipment: Option<String>,
    pub notes: Option<String>,
}

/// Key for case-insensitive name comparison. SQLite's `lower()` and
/// `NOCASE` only fold ASCII, so folding happens here.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Trim the name and upper-case its first letter.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Per-user exercise catalogue.

pub mod manager;
pub mod types;

pub use manager::ExerciseManager;
pub use types::{name_key, Exercise, ExerciseDraft, ExercisePatch};

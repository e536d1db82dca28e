//! Personal-best tracking.

pub mod engine;
pub mod types;

pub use engine::RecordManager;
pub use types::{estimate_one_rm, PbCandidate, PbKind, PersonalBest};

//! LiftLog - Personal Strength Training Log
//!
//! A self-hosted training log built on SQLite. Users keep an exercise
//! catalogue, build programs of workout templates, log sessions of sets and
//! collect personal bests derived from them. Programs and records can be
//! shared with other users, and friend requests connect accounts.

pub mod error;
pub mod exercises;
pub mod logbook;
pub mod programs;
pub mod records;
pub mod sessions;
pub mod social;
pub mod storage;
pub mod users;

// Re-export commonly used types
pub use error::{ErrorKind, LiftError, Result};
pub use logbook::Logbook;
pub use programs::{CascadeReport, CopyOverrides, ProgramTree};
pub use records::{PbKind, PersonalBest};
pub use social::Decision;
pub use storage::config::AppConfig;

//! Logged training sessions.

pub mod manager;
pub mod types;

pub use manager::SessionManager;
pub use types::{FinishedSession, Session, SessionStatus, SessionWithSets, SetDraft, SetLog};

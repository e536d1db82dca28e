//! Training session and set log types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::records::PersonalBest;
use crate::storage::database::UnknownVariant;

/// Session lifecycle. `InProgress` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Done,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Done => "done",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

impl FromStr for SessionStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(SessionStatus::InProgress),
            "done" => Ok(SessionStatus::Done),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(UnknownVariant::new("session status", other)),
        }
    }
}

/// A logged workout, started from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub template_id: Uuid,
    pub program_id: Uuid,
    /// Name of the template when the session started; never refreshed
    pub template_name: String,
    /// Name of the program when the session started; never refreshed
    pub program_name: String,
    pub date: NaiveDate,
    pub status: SessionStatus,
}

/// One performed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLog {
    pub id: Uuid,
    pub session_id: Uuid,
    pub exercise_id: Uuid,
    /// Not required to be unique within a session
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub rpe: f64,
    pub comment: String,
}

/// Fields for logging a set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDraft {
    pub exercise_id: Uuid,
    #[serde(default = "default_set_number")]
    pub set_number: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub rpe: f64,
    #[serde(default)]
    pub comment: String,
}

fn default_set_number() -> u32 {
    1
}

impl SetDraft {
    /// Draft for `weight` x `reps` of an exercise.
    pub fn new(exercise_id: Uuid, weight: f64, reps: u32) -> Self {
        Self {
            exercise_id,
            set_number: 1,
            weight,
            reps,
            rpe: 0.0,
            comment: String::new(),
        }
    }
}

/// A session with its set logs in logging order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWithSets {
    pub session: Session,
    pub set_logs: Vec<SetLog>,
}

/// Result of finishing a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedSession {
    pub session: Session,
    pub set_logs: Vec<SetLog>,
    /// Records inserted or improved by this session
    pub personal_bests: Vec<PersonalBest>,
}

//! Personal-best record types and candidate derivation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::sessions::SetLog;
use crate::storage::database::UnknownVariant;

/// Divisor of the Epley one-rep-max estimate.
pub const EPLEY_DIVISOR: f64 = 30.0;

/// Which metric a personal best tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PbKind {
    /// Estimated one-rep max, regardless of rep count
    #[serde(rename = "est_1rm")]
    Est1Rm,
    /// Heaviest weight for one exact rep count
    MaxWeightReps,
    /// Heaviest weight times reps in a single set
    MaxVolume,
}

impl PbKind {
    pub const ALL: [PbKind; 3] = [PbKind::Est1Rm, PbKind::MaxWeightReps, PbKind::MaxVolume];

    pub fn as_str(&self) -> &'static str {
        match self {
            PbKind::Est1Rm => "est_1rm",
            PbKind::MaxWeightReps => "max_weight_reps",
            PbKind::MaxVolume => "max_volume",
        }
    }

    /// Whether the rep count is part of the record key.
    pub fn keyed_by_reps(&self) -> bool {
        matches!(self, PbKind::MaxWeightReps)
    }

    /// Rep component of the stored key; kinds not keyed by reps share one slot.
    pub fn rep_key(&self, reps: u32) -> i64 {
        if self.keyed_by_reps() {
            i64::from(reps)
        } else {
            -1
        }
    }

    /// Human-readable label.
    pub fn label(&self, reps: u32) -> String {
        match self {
            PbKind::Est1Rm => "1RM (est)".to_string(),
            PbKind::MaxWeightReps => format!("Max weight for {reps} reps"),
            PbKind::MaxVolume => "Max volume".to_string(),
        }
    }
}

impl fmt::Display for PbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PbKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "est_1rm" => Ok(PbKind::Est1Rm),
            "max_weight_reps" => Ok(PbKind::MaxWeightReps),
            "max_volume" => Ok(PbKind::MaxVolume),
            other => Err(UnknownVariant::new("personal best kind", other)),
        }
    }
}

/// Current best for one `(owner, exercise, kind[, reps])` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalBest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub exercise_id: Uuid,
    pub kind: PbKind,
    pub label: String,
    pub value: f64,
    pub reps: u32,
    /// Date of the session that set the record
    pub date: NaiveDate,
    pub set_log_id: Uuid,
    pub is_public: bool,
}

/// A value one set could set as a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PbCandidate {
    pub kind: PbKind,
    pub value: f64,
    pub reps: u32,
    pub label: String,
}

/// Epley estimate: `weight * (1 + reps / 30)`.
pub fn estimate_one_rm(weight: f64, reps: u32) -> f64 {
    weight * (1.0 + f64::from(reps) / EPLEY_DIVISOR)
}

/// The three candidates a logged set produces, in merge order.
pub fn candidates_for(set: &SetLog) -> [PbCandidate; 3] {
    let reps = set.reps;
    let value_for = |kind: PbKind| match kind {
        PbKind::Est1Rm => estimate_one_rm(set.weight, reps),
        PbKind::MaxWeightReps => set.weight,
        PbKind::MaxVolume => set.weight * f64::from(reps),
    };

    PbKind::ALL.map(|kind| PbCandidate {
        kind,
        value: value_for(kind),
        reps,
        label: kind.label(reps),
    })
}

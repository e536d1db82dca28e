//! Program, workout template and template row definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::exercises::Exercise;
use crate::storage::database::UnknownVariant;

/// Lifecycle status of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    #[default]
    Active,
    Archived,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Active => "active",
            ProgramStatus::Archived => "archived",
        }
    }
}

impl FromStr for ProgramStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProgramStatus::Active),
            "archived" => Ok(ProgramStatus::Archived),
            other => Err(UnknownVariant::new("program status", other)),
        }
    }
}

/// Who may see a program. `Public` is the only level that grants access to
/// other users; `Friends` is recorded but grants nothing beyond `Private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Friends,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Friends => "friends",
            Visibility::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "friends" => Ok(Visibility::Friends),
            "public" => Ok(Visibility::Public),
            other => Err(UnknownVariant::new("visibility", other)),
        }
    }
}

/// A training program, root of a template subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// Free-form, as entered by the user
    pub start_date: String,
    pub end_date: String,
    pub status: ProgramStatus,
    pub version: u32,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl Program {
    /// Derived from `visibility`, which is the single source of truth.
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether `viewer` may read this program.
    pub fn is_visible_to(&self, viewer: Uuid) -> bool {
        self.owner_id == viewer || self.is_public()
    }
}

/// Fields for a new program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: ProgramStatus,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub visibility: Visibility,
}

fn default_version() -> u32 {
    1
}

impl ProgramDraft {
    /// Draft with a name and defaults elsewhere.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            status: ProgramStatus::Active,
            version: 1,
            visibility: Visibility::Private,
        }
    }
}

/// Partial program update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<ProgramStatus>,
    pub version: Option<u32>,
    pub visibility: Option<Visibility>,
}

/// Overrides for a same-owner copy ("version bump").
///
/// Unset fields default to `"{name} (copy)"`, the source version plus one
/// and the source dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyOverrides {
    pub name: Option<String>,
    pub version: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A workout template inside a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: Uuid,
    pub program_id: Uuid,
    /// Copied from the program for ownership checks
    pub owner_id: Uuid,
    pub name: String,
}

/// One planned exercise in a template. Planning fields are opaque text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub exercise_id: Uuid,
    pub planned_sets: String,
    pub reps: String,
    pub planned_weight: String,
    pub rpe: String,
    pub rest: String,
    pub comment: String,
}

impl TemplateRow {
    /// Copy of this row with a fresh id under another template.
    pub(crate) fn duplicate_into(&self, template_id: Uuid, exercise_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id,
            exercise_id,
            ..self.clone()
        }
    }
}

/// Fields for a new template row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowDraft {
    pub exercise_id: Uuid,
    #[serde(default)]
    pub planned_sets: String,
    #[serde(default)]
    pub reps: String,
    #[serde(default)]
    pub planned_weight: String,
    #[serde(default)]
    pub rpe: String,
    #[serde(default)]
    pub rest: String,
    #[serde(default)]
    pub comment: String,
}

impl RowDraft {
    /// Draft for an exercise with empty planning fields.
    pub fn for_exercise(exercise_id: Uuid) -> Self {
        Self {
            exercise_id,
            planned_sets: String::new(),
            reps: String::new(),
            planned_weight: String::new(),
            rpe: String::new(),
            rest: String::new(),
            comment: String::new(),
        }
    }
}

/// Partial template row update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowPatch {
    pub exercise_id: Option<Uuid>,
    pub planned_sets: Option<String>,
    pub reps: Option<String>,
    pub planned_weight: Option<String>,
    pub rpe: Option<String>,
    pub rest: Option<String>,
    pub comment: Option<String>,
}

/// A template together with its rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateWithRows {
    pub template: WorkoutTemplate,
    pub rows: Vec<TemplateRow>,
}

/// A whole program subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramTree {
    pub program: Program,
    pub templates: Vec<TemplateWithRows>,
}

impl ProgramTree {
    /// Total number of rows across all templates.
    pub fn row_count(&self) -> usize {
        self.templates.iter().map(|t| t.rows.len()).sum()
    }
}

/// Row joined with its exercise, for read-only program views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDetail {
    pub row: TemplateRow,
    /// `None` when the referenced exercise no longer exists
    pub exercise: Option<Exercise>,
}

/// Template joined with exercise details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDetail {
    pub template: WorkoutTemplate,
    pub rows: Vec<RowDetail>,
}

/// Read-only program view for sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDetail {
    pub program: Program,
    pub templates: Vec<TemplateDetail>,
}

/// A template row whose exercise reference is broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row: TemplateRow,
    pub problem: RowProblem,
}

/// What is wrong with an audited row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowProblem {
    MissingExercise,
    ForeignExercise,
}

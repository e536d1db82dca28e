//! Training programs, workout templates and template rows.

pub mod cascade;
pub mod manager;
pub mod types;

pub use cascade::{CascadeManager, CascadeReport, ForkedProgram};
pub use manager::ProgramManager;
pub use types::{
    CopyOverrides, Program, ProgramDetail, ProgramDraft, ProgramPatch, ProgramStatus,
    ProgramTree, RowDetail, RowDraft, RowIssue, RowPatch, RowProblem, TemplateDetail,
    TemplateRow, TemplateWithRows, Visibility, WorkoutTemplate,
};

//! Program, template and row management.
//!
//! Every mutation checks that the acting user owns the target. Rows may only
//! reference exercises owned by the program's owner.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{
    Program, ProgramDetail, ProgramDraft, ProgramPatch, ProgramTree, RowDetail, RowDraft,
    RowIssue, RowPatch, RowProblem, TemplateDetail, TemplateRow, TemplateWithRows,
    WorkoutTemplate,
};
use crate::error::{ensure_owner, LiftError, Result};
use crate::exercises::ExerciseManager;
use crate::storage::database::{enum_at, timestamp_at, uuid_at};

const PROGRAM_COLUMNS: &str = "id, owner_id, name, description, start_date, end_date, status,
     version, visibility, created_at";
const TEMPLATE_COLUMNS: &str = "id, program_id, owner_id, name";
const ROW_COLUMNS: &str = "id, template_id, exercise_id, planned_sets, reps, planned_weight,
     rpe, rest, comment";

/// Manager for programs and their templates.
pub struct ProgramManager<'a> {
    conn: &'a Connection,
}

impl<'a> ProgramManager<'a> {
    /// Create a new program manager over a connection or transaction.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Program Operations ==========

    /// Create a program owned by `actor`.
    pub fn create_program(&self, actor: Uuid, draft: &ProgramDraft) -> Result<Program> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(LiftError::Validation("Program name is required".to_string()));
        }
        if draft.version == 0 {
            return Err(LiftError::Validation("Program version starts at 1".to_string()));
        }

        let program = Program {
            id: Uuid::new_v4(),
            owner_id: actor,
            name: name.to_string(),
            description: draft.description.clone(),
            start_date: draft.start_date.clone(),
            end_date: draft.end_date.clone(),
            status: draft.status,
            version: draft.version,
            visibility: draft.visibility,
            created_at: Utc::now(),
        };
        self.insert_program(&program)?;
        Ok(program)
    }

    pub(crate) fn insert_program(&self, program: &Program) -> Result<()> {
        self.conn.execute(
            "INSERT INTO programs (id, owner_id, name, description, start_date, end_date,
                                   status, version, visibility, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                program.id.to_string(),
                program.owner_id.to_string(),
                program.name,
                program.description,
                program.start_date,
                program.end_date,
                program.status.as_str(),
                program.version,
                program.visibility.as_str(),
                program.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Apply a partial update to a program.
    pub fn update_program(&self, actor: Uuid, program_id: Uuid, patch: &ProgramPatch) -> Result<Program> {
        let mut program = self.require_owned_program(actor, program_id)?;

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(LiftError::Validation("Program name is required".to_string()));
            }
            program.name = name.to_string();
        }
        if let Some(description) = &patch.description {
            program.description = description.clone();
        }
        if let Some(start_date) = &patch.start_date {
            program.start_date = start_date.clone();
        }
        if let Some(end_date) = &patch.end_date {
            program.end_date = end_date.clone();
        }
        if let Some(status) = patch.status {
            program.status = status;
        }
        if let Some(version) = patch.version {
            if version == 0 {
                return Err(LiftError::Validation("Program version starts at 1".to_string()));
            }
            program.version = version;
        }
        if let Some(visibility) = patch.visibility {
            program.visibility = visibility;
        }

        self.conn.execute(
            "UPDATE programs SET name = ?2, description = ?3, start_date = ?4, end_date = ?5,
                                 status = ?6, version = ?7, visibility = ?8
             WHERE id = ?1",
            params![
                program.id.to_string(),
                program.name,
                program.description,
                program.start_date,
                program.end_date,
                program.status.as_str(),
                program.version,
                program.visibility.as_str(),
            ],
        )?;

        Ok(program)
    }

    /// Get a program by ID.
    pub fn get_program(&self, id: Uuid) -> Result<Option<Program>> {
        let sql = format!("SELECT {PROGRAM_COLUMNS} FROM programs WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_program_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Get a program, failing with `NotFound` when absent.
    pub fn require_program(&self, id: Uuid) -> Result<Program> {
        self.get_program(id)?.ok_or(LiftError::NotFound("Program"))
    }

    /// Get a program the actor owns.
    pub fn require_owned_program(&self, actor: Uuid, id: Uuid) -> Result<Program> {
        let program = self.require_program(id)?;
        ensure_owner(program.owner_id, actor, "Program")?;
        Ok(program)
    }

    /// Programs of an owner; `public_only` restricts to shared ones.
    pub fn list_programs(&self, owner: Uuid, public_only: bool) -> Result<Vec<Program>> {
        let filter = if public_only {
            " AND visibility = 'public'"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE owner_id = ?1{filter} ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let programs = stmt
            .query_map(params![owner.to_string()], parse_program_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(programs)
    }

    // ========== Template Operations ==========

    /// Create a template under a program the actor owns.
    pub fn create_template(&self, actor: Uuid, program_id: Uuid, name: &str) -> Result<WorkoutTemplate> {
        let program = self.require_owned_program(actor, program_id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LiftError::Validation("Template name is required".to_string()));
        }

        let template = WorkoutTemplate {
            id: Uuid::new_v4(),
            program_id: program.id,
            owner_id: program.owner_id,
            name: name.to_string(),
        };
        self.insert_template(&template)?;
        Ok(template)
    }

    pub(crate) fn insert_template(&self, template: &WorkoutTemplate) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workout_templates (id, program_id, owner_id, name) VALUES (?1, ?2, ?3, ?4)",
            params![
                template.id.to_string(),
                template.program_id.to_string(),
                template.owner_id.to_string(),
                template.name,
            ],
        )?;
        Ok(())
    }

    /// Rename a template and/or move it to another program of the same owner.
    pub fn update_template(
        &self,
        actor: Uuid,
        template_id: Uuid,
        name: Option<&str>,
        program_id: Option<Uuid>,
    ) -> Result<WorkoutTemplate> {
        let mut template = self.require_owned_template(actor, template_id)?;

        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(LiftError::Validation("Template name is required".to_string()));
            }
            template.name = name.to_string();
        }
        if let Some(program_id) = program_id {
            self.require_owned_program(actor, program_id)?;
            template.program_id = program_id;
        }

        self.conn.execute(
            "UPDATE workout_templates SET name = ?2, program_id = ?3 WHERE id = ?1",
            params![
                template.id.to_string(),
                template.name,
                template.program_id.to_string(),
            ],
        )?;
        Ok(template)
    }

    /// Get a template by ID.
    pub fn get_template(&self, id: Uuid) -> Result<Option<WorkoutTemplate>> {
        let sql = format!("SELECT {TEMPLATE_COLUMNS} FROM workout_templates WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_template_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Get a template the actor owns.
    pub fn require_owned_template(&self, actor: Uuid, id: Uuid) -> Result<WorkoutTemplate> {
        let template = self
            .get_template(id)?
            .ok_or(LiftError::NotFound("Template"))?;
        ensure_owner(template.owner_id, actor, "Template")?;
        Ok(template)
    }

    /// Templates of a program in creation order.
    pub fn templates_of(&self, program_id: Uuid) -> Result<Vec<WorkoutTemplate>> {
        let sql = format!(
            "SELECT {TEMPLATE_COLUMNS} FROM workout_templates WHERE program_id = ?1 ORDER BY rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let templates = stmt
            .query_map(params![program_id.to_string()], parse_template_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(templates)
    }

    /// The actor's templates with their rows, optionally for one program.
    pub fn list_templates(&self, actor: Uuid, program_id: Option<Uuid>) -> Result<Vec<TemplateWithRows>> {
        let templates = match program_id {
            Some(program_id) => {
                self.require_owned_program(actor, program_id)?;
                self.templates_of(program_id)?
            }
            None => {
                let sql = format!(
                    "SELECT {TEMPLATE_COLUMNS} FROM workout_templates WHERE owner_id = ?1 ORDER BY rowid"
                );
                let mut stmt = self.conn.prepare(&sql)?;
                let templates = stmt
                    .query_map(params![actor.to_string()], parse_template_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                templates
            }
        };

        templates
            .into_iter()
            .map(|template| {
                let rows = self.rows_of(template.id)?;
                Ok(TemplateWithRows { template, rows })
            })
            .collect()
    }

    // ========== Row Operations ==========

    /// Add an exercise row to a template.
    pub fn add_row(&self, actor: Uuid, template_id: Uuid, draft: &RowDraft) -> Result<TemplateRow> {
        let template = self.require_owned_template(actor, template_id)?;
        self.check_row_exercise(template.owner_id, draft.exercise_id)?;

        let row = TemplateRow {
            id: Uuid::new_v4(),
            template_id: template.id,
            exercise_id: draft.exercise_id,
            planned_sets: draft.planned_sets.clone(),
            reps: draft.reps.clone(),
            planned_weight: draft.planned_weight.clone(),
            rpe: draft.rpe.clone(),
            rest: draft.rest.clone(),
            comment: draft.comment.clone(),
        };
        self.insert_row(&row)?;
        Ok(row)
    }

    pub(crate) fn insert_row(&self, row: &TemplateRow) -> Result<()> {
        self.conn.execute(
            "INSERT INTO template_rows (id, template_id, exercise_id, planned_sets, reps,
                                        planned_weight, rpe, rest, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                row.id.to_string(),
                row.template_id.to_string(),
                row.exercise_id.to_string(),
                row.planned_sets,
                row.reps,
                row.planned_weight,
                row.rpe,
                row.rest,
                row.comment,
            ],
        )?;
        Ok(())
    }

    /// Update a row of a template.
    pub fn update_row(
        &self,
        actor: Uuid,
        template_id: Uuid,
        row_id: Uuid,
        patch: &RowPatch,
    ) -> Result<TemplateRow> {
        let template = self.require_owned_template(actor, template_id)?;
        let mut row = self.require_row_in(template.id, row_id)?;

        if let Some(exercise_id) = patch.exercise_id {
            self.check_row_exercise(template.owner_id, exercise_id)?;
            row.exercise_id = exercise_id;
        }
        if let Some(planned_sets) = &patch.planned_sets {
            row.planned_sets = planned_sets.clone();
        }
        if let Some(reps) = &patch.reps {
            row.reps = reps.clone();
        }
        if let Some(planned_weight) = &patch.planned_weight {
            row.planned_weight = planned_weight.clone();
        }
        if let Some(rpe) = &patch.rpe {
            row.rpe = rpe.clone();
        }
        if let Some(rest) = &patch.rest {
            row.rest = rest.clone();
        }
        if let Some(comment) = &patch.comment {
            row.comment = comment.clone();
        }

        self.conn.execute(
            "UPDATE template_rows SET exercise_id = ?2, planned_sets = ?3, reps = ?4,
                                      planned_weight = ?5, rpe = ?6, rest = ?7, comment = ?8
             WHERE id = ?1",
            params![
                row.id.to_string(),
                row.exercise_id.to_string(),
                row.planned_sets,
                row.reps,
                row.planned_weight,
                row.rpe,
                row.rest,
                row.comment,
            ],
        )?;
        Ok(row)
    }

    fn check_row_exercise(&self, owner: Uuid, exercise_id: Uuid) -> Result<()> {
        ExerciseManager::new(self.conn).require_owned(owner, exercise_id)?;
        Ok(())
    }

    /// Get a row that must belong to `template_id`.
    pub fn require_row_in(&self, template_id: Uuid, row_id: Uuid) -> Result<TemplateRow> {
        let sql = format!("SELECT {ROW_COLUMNS} FROM template_rows WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![row_id.to_string()], parse_row_row)
            .optional()?;

        match row {
            Some(row) if row.template_id == template_id => Ok(row),
            _ => Err(LiftError::NotFound("Template row")),
        }
    }

    /// Rows of a template in insertion order.
    pub fn rows_of(&self, template_id: Uuid) -> Result<Vec<TemplateRow>> {
        let sql = format!("SELECT {ROW_COLUMNS} FROM template_rows WHERE template_id = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![template_id.to_string()], parse_row_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ========== Subtree Views ==========

    /// Load a program with all templates and rows, without access checks.
    pub fn load_tree(&self, program: Program) -> Result<ProgramTree> {
        let templates = self
            .templates_of(program.id)?
            .into_iter()
            .map(|template| {
                let rows = self.rows_of(template.id)?;
                Ok(TemplateWithRows { template, rows })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProgramTree { program, templates })
    }

    /// Program subtree with each row joined to its exercise.
    pub fn load_detail(&self, program: Program) -> Result<ProgramDetail> {
        let tree = self.load_tree(program)?;
        let exercises = ExerciseManager::new(self.conn);

        let templates = tree
            .templates
            .into_iter()
            .map(|t| {
                let rows = t
                    .rows
                    .into_iter()
                    .map(|row| {
                        let exercise = exercises.get(row.exercise_id)?;
                        Ok(RowDetail { row, exercise })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TemplateDetail {
                    template: t.template,
                    rows,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProgramDetail {
            program: tree.program,
            templates,
        })
    }

    /// Rows in the owner's templates whose exercise is missing or belongs to
    /// another user.
    pub fn audit_rows(&self, owner: Uuid) -> Result<Vec<RowIssue>> {
        let exercises = ExerciseManager::new(self.conn);
        let mut issues = Vec::new();

        for TemplateWithRows { rows, .. } in self.list_templates(owner, None)? {
            for row in rows {
                let problem = match exercises.get(row.exercise_id)? {
                    None => Some(RowProblem::MissingExercise),
                    Some(ex) if ex.owner_id != owner => Some(RowProblem::ForeignExercise),
                    Some(_) => None,
                };
                if let Some(problem) = problem {
                    issues.push(RowIssue { row, problem });
                }
            }
        }

        if !issues.is_empty() {
            tracing::warn!("Audit found {} inconsistent template rows for {}", issues.len(), owner);
        }
        Ok(issues)
    }
}

fn parse_program_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        id: uuid_at(row, 0)?,
        owner_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        status: enum_at(row, 6)?,
        version: row.get(7)?,
        visibility: enum_at(row, 8)?,
        created_at: timestamp_at(row, 9)?,
    })
}

fn parse_template_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutTemplate> {
    Ok(WorkoutTemplate {
        id: uuid_at(row, 0)?,
        program_id: uuid_at(row, 1)?,
        owner_id: uuid_at(row, 2)?,
        name: row.get(3)?,
    })
}

fn parse_row_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateRow> {
    Ok(TemplateRow {
        id: uuid_at(row, 0)?,
        template_id: uuid_at(row, 1)?,
        exercise_id: uuid_at(row, 2)?,
        planned_sets: row.get(3)?,
        reps: row.get(4)?,
        planned_weight: row.get(5)?,
        rpe: row.get(6)?,
        rest: row.get(7)?,
        comment: row.get(8)?,
    })
}

//! Cascading delete, copy and fork of owned subtrees.
//!
//! Callers run these inside one transaction; a failure partway leaves the
//! store untouched once the transaction is dropped.

use std::collections::HashMap;

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::manager::ProgramManager;
use super::types::{
    CopyOverrides, Program, ProgramStatus, ProgramTree, TemplateWithRows, Visibility,
    WorkoutTemplate,
};
use crate::error::{LiftError, Result};
use crate::exercises::{Exercise, ExerciseManager};
use crate::sessions::SessionManager;

/// Counts of descendants removed by a cascading delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub templates: usize,
    pub rows: usize,
    pub sessions: usize,
    pub set_logs: usize,
    pub personal_bests: usize,
}

impl CascadeReport {
    /// Total number of removed descendants, excluding the root itself.
    pub fn total(&self) -> usize {
        self.templates + self.rows + self.sessions + self.set_logs + self.personal_bests
    }
}

/// A forked program together with the exercises created for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkedProgram {
    pub tree: ProgramTree,
    pub exercises: Vec<Exercise>,
}

/// Cascade operations over the program graph.
pub struct CascadeManager<'a> {
    conn: &'a Connection,
}

impl<'a> CascadeManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn programs(&self) -> ProgramManager<'a> {
        ProgramManager::new(self.conn)
    }

    fn sessions(&self) -> SessionManager<'a> {
        SessionManager::new(self.conn)
    }

    // ========== Deletes ==========

    /// Delete a program with its templates, rows, sessions and set logs.
    /// Personal bests survive.
    pub fn delete_program(&self, actor: Uuid, program_id: Uuid) -> Result<CascadeReport> {
        let program = self.programs().require_owned_program(actor, program_id)?;
        let mut report = CascadeReport::default();

        let sessions = self.sessions();
        for session_id in sessions.session_ids_for_program(program.id)? {
            report.set_logs += sessions.delete_set_logs(session_id)?;
            report.sessions += sessions.delete_row(session_id)?;
        }

        for template in self.programs().templates_of(program.id)? {
            report.rows += self.remove_template(&template)?;
            report.templates += 1;
        }

        self.conn.execute(
            "DELETE FROM programs WHERE id = ?1",
            params![program.id.to_string()],
        )?;

        tracing::info!(
            "Deleted program {} and {} descendants",
            program.name,
            report.total()
        );
        Ok(report)
    }

    /// Delete a template with its rows. Sessions started from it keep their
    /// snapshot and their sets.
    pub fn delete_template(&self, actor: Uuid, template_id: Uuid) -> Result<CascadeReport> {
        let template = self.programs().require_owned_template(actor, template_id)?;
        let rows = self.remove_template(&template)?;

        tracing::info!("Deleted template {} with {} rows", template.name, rows);
        Ok(CascadeReport {
            templates: 1,
            rows,
            ..Default::default()
        })
    }

    fn remove_template(&self, template: &WorkoutTemplate) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM template_rows WHERE template_id = ?1",
            params![template.id.to_string()],
        )?;
        self.conn.execute(
            "DELETE FROM workout_templates WHERE id = ?1",
            params![template.id.to_string()],
        )?;
        Ok(rows)
    }

    /// Delete a row, plus the sets of its exercise logged in sessions
    /// started from the same template.
    pub fn delete_row(&self, actor: Uuid, template_id: Uuid, row_id: Uuid) -> Result<CascadeReport> {
        let programs = self.programs();
        let template = programs.require_owned_template(actor, template_id)?;
        let row = programs.require_row_in(template.id, row_id)?;

        let set_logs = self.conn.execute(
            "DELETE FROM set_logs
             WHERE exercise_id = ?1
               AND session_id IN (SELECT id FROM sessions WHERE template_id = ?2)",
            params![row.exercise_id.to_string(), template.id.to_string()],
        )?;
        self.conn.execute(
            "DELETE FROM template_rows WHERE id = ?1",
            params![row.id.to_string()],
        )?;

        tracing::debug!("Deleted row {} and {} set logs", row.id, set_logs);
        Ok(CascadeReport {
            rows: 1,
            set_logs,
            ..Default::default()
        })
    }

    /// Delete a session and its set logs.
    pub fn delete_session(&self, actor: Uuid, session_id: Uuid) -> Result<CascadeReport> {
        let sessions = self.sessions();
        let session = sessions.require_owned(actor, session_id)?;

        let set_logs = sessions.delete_set_logs(session.id)?;
        sessions.delete_row(session.id)?;

        tracing::info!("Deleted session {} with {} sets", session.id, set_logs);
        Ok(CascadeReport {
            sessions: 1,
            set_logs,
            ..Default::default()
        })
    }

    /// Delete an exercise with the rows, set logs and personal bests that
    /// reference it.
    pub fn delete_exercise(&self, actor: Uuid, exercise_id: Uuid) -> Result<CascadeReport> {
        let exercise = ExerciseManager::new(self.conn).require_owned(actor, exercise_id)?;
        let id = exercise.id.to_string();

        let rows = self
            .conn
            .execute("DELETE FROM template_rows WHERE exercise_id = ?1", params![id])?;
        let set_logs = self
            .conn
            .execute("DELETE FROM set_logs WHERE exercise_id = ?1", params![id])?;
        let personal_bests = self
            .conn
            .execute("DELETE FROM personal_bests WHERE exercise_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;

        let report = CascadeReport {
            rows,
            set_logs,
            personal_bests,
            ..Default::default()
        };
        tracing::info!(
            "Deleted exercise {} and {} dependents",
            exercise.name,
            report.total()
        );
        Ok(report)
    }

    // ========== Copy & Fork ==========

    /// Duplicate an owned program as a new version. Rows keep pointing at
    /// the same exercises.
    pub fn copy_program(
        &self,
        actor: Uuid,
        source_id: Uuid,
        overrides: &CopyOverrides,
    ) -> Result<ProgramTree> {
        let programs = self.programs();
        let source = programs.require_owned_program(actor, source_id)?;
        let tree = programs.load_tree(source)?;

        let name = match &overrides.name {
            Some(name) if name.trim().is_empty() => {
                return Err(LiftError::Validation("Program name is required".to_string()))
            }
            Some(name) => name.trim().to_string(),
            None => format!("{} (copy)", tree.program.name),
        };
        let version = overrides.version.unwrap_or(tree.program.version + 1);
        if version == 0 {
            return Err(LiftError::Validation("Program version starts at 1".to_string()));
        }

        let program = Program {
            id: Uuid::new_v4(),
            name,
            version,
            start_date: overrides
                .start_date
                .clone()
                .unwrap_or_else(|| tree.program.start_date.clone()),
            end_date: overrides
                .end_date
                .clone()
                .unwrap_or_else(|| tree.program.end_date.clone()),
            status: ProgramStatus::Active,
            created_at: chrono::Utc::now(),
            ..tree.program.clone()
        };

        let copy = self.clone_tree(program, &tree.templates, Some)?;
        tracing::info!(
            "Copied program {} to {} (version {})",
            tree.program.name,
            copy.program.name,
            copy.program.version
        );
        Ok(copy)
    }

    /// Fork a public (or own) program into `actor`'s account.
    ///
    /// Exercises of another owner are duplicated into the forker's catalogue;
    /// rows whose exercise no longer exists are dropped.
    pub fn fork_program(&self, actor: Uuid, source_id: Uuid) -> Result<ForkedProgram> {
        let programs = self.programs();
        let source = programs.require_program(source_id)?;
        if !source.is_visible_to(actor) {
            return Err(LiftError::Authorization("Program is not public".to_string()));
        }
        let own = source.owner_id == actor;
        let tree = programs.load_tree(source)?;

        let (remap, exercises) = if own {
            (self.identity_remap(actor, &tree)?, Vec::new())
        } else {
            self.copy_exercises(actor, &tree)?
        };

        let program = Program {
            id: Uuid::new_v4(),
            owner_id: actor,
            name: if own {
                tree.program.name.clone()
            } else {
                format!("{} (copy)", tree.program.name)
            },
            version: 1,
            visibility: Visibility::Private,
            created_at: chrono::Utc::now(),
            ..tree.program.clone()
        };

        let fork = self.clone_tree(program, &tree.templates, |id| remap.get(&id).copied())?;

        let dropped = tree.row_count() - fork.row_count();
        if dropped > 0 {
            tracing::warn!(
                "Fork of {} dropped {} rows with missing exercises",
                tree.program.id,
                dropped
            );
        }
        tracing::info!(
            "Forked program {} for {} ({} exercises copied)",
            tree.program.name,
            actor,
            exercises.len()
        );

        Ok(ForkedProgram {
            tree: fork,
            exercises,
        })
    }

    /// Map every existing exercise the tree uses onto itself.
    fn identity_remap(&self, actor: Uuid, tree: &ProgramTree) -> Result<HashMap<Uuid, Uuid>> {
        let exercises = ExerciseManager::new(self.conn);
        let mut remap = HashMap::new();
        for id in referenced_exercises(tree) {
            match exercises.get(id)? {
                Some(ex) if ex.owner_id == actor => {
                    remap.insert(id, id);
                }
                _ => {}
            }
        }
        Ok(remap)
    }

    /// Duplicate the tree's exercises for `actor`, returning old→new ids.
    fn copy_exercises(
        &self,
        actor: Uuid,
        tree: &ProgramTree,
    ) -> Result<(HashMap<Uuid, Uuid>, Vec<Exercise>)> {
        let manager = ExerciseManager::new(self.conn);
        let mut remap = HashMap::new();
        let mut created = Vec::new();

        for source in manager.get_many(&referenced_exercises(tree))? {
            let copy = Exercise {
                id: Uuid::new_v4(),
                owner_id: actor,
                name: self.free_name(&manager, actor, &source.name)?,
                ..source.clone()
            };
            manager.insert(&copy)?;
            tracing::debug!("Copied exercise {} as {}", source.id, copy.id);

            remap.insert(source.id, copy.id);
            created.push(copy);
        }

        Ok((remap, created))
    }

    /// `name`, or `name (n)` for the first n ≥ 2 the owner doesn't use yet.
    fn free_name(&self, exercises: &ExerciseManager<'_>, owner: Uuid, name: &str) -> Result<String> {
        if exercises.find_by_name(owner, name)?.is_none() {
            return Ok(name.to_string());
        }
        let mut n = 2;
        loop {
            let candidate = format!("{name} ({n})");
            if exercises.find_by_name(owner, &candidate)?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Insert `program` with copies of `templates`. Rows whose exercise
    /// `map_exercise` returns `None` for are skipped.
    fn clone_tree<F>(
        &self,
        program: Program,
        templates: &[TemplateWithRows],
        map_exercise: F,
    ) -> Result<ProgramTree>
    where
        F: Fn(Uuid) -> Option<Uuid>,
    {
        let programs = self.programs();
        programs.insert_program(&program)?;

        let mut copies = Vec::with_capacity(templates.len());
        for source in templates {
            let template = WorkoutTemplate {
                id: Uuid::new_v4(),
                program_id: program.id,
                owner_id: program.owner_id,
                name: source.template.name.clone(),
            };
            programs.insert_template(&template)?;

            let mut rows = Vec::with_capacity(source.rows.len());
            for row in &source.rows {
                if let Some(exercise_id) = map_exercise(row.exercise_id) {
                    let copy = row.duplicate_into(template.id, exercise_id);
                    programs.insert_row(&copy)?;
                    rows.push(copy);
                }
            }
            copies.push(TemplateWithRows { template, rows });
        }

        Ok(ProgramTree {
            program,
            templates: copies,
        })
    }
}

/// Distinct exercise ids referenced by the tree's rows, in row order.
fn referenced_exercises(tree: &ProgramTree) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::new();
    for row in tree.templates.iter().flat_map(|t| t.rows.iter()) {
        if !ids.contains(&row.exercise_id) {
            ids.push(row.exercise_id);
        }
    }
    ids
}

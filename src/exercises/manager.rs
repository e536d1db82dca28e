//! Exercise catalogue management.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{name_key, normalize_name, Exercise, ExerciseDraft, ExercisePatch};
use crate::error::{ensure_owner, LiftError, Result};
use crate::storage::database::uuid_at;

const EXERCISE_COLUMNS: &str =
    "id, owner_id, name, muscle_group, exercise_type, equipment, notes";

/// Manager for a user's exercises.
pub struct ExerciseManager<'a> {
    conn: &'a Connection,
}

impl<'a> ExerciseManager<'a> {
    /// Create a new exercise manager over a connection or transaction.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create an exercise owned by `actor`.
    pub fn create(&self, actor: Uuid, draft: &ExerciseDraft) -> Result<Exercise> {
        let name = self.checked_name(actor, &draft.name, None)?;

        let exercise = Exercise {
            id: Uuid::new_v4(),
            owner_id: actor,
            name,
            muscle_group: draft.muscle_group.clone(),
            exercise_type: draft.exercise_type.clone(),
            equipment: draft.equipment.clone(),
            notes: draft.notes.clone(),
        };
        self.insert(&exercise)?;

        tracing::debug!("Created exercise {} for {}", exercise.name, actor);
        Ok(exercise)
    }

    /// Insert a fully formed exercise row without name normalization.
    pub(crate) fn insert(&self, exercise: &Exercise) -> Result<()> {
        self.conn.execute(
            "INSERT INTO exercises (id, owner_id, name, name_key, muscle_group, exercise_type,
                                    equipment, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                exercise.id.to_string(),
                exercise.owner_id.to_string(),
                exercise.name,
                name_key(&exercise.name),
                exercise.muscle_group,
                exercise.exercise_type,
                exercise.equipment,
                exercise.notes,
            ],
        )?;
        Ok(())
    }

    /// Apply a partial update. Renames re-check uniqueness against the
    /// owner's other exercises.
    pub fn update(&self, actor: Uuid, exercise_id: Uuid, patch: &ExercisePatch) -> Result<Exercise> {
        let mut exercise = self.require_owned(actor, exercise_id)?;

        if let Some(name) = &patch.name {
            exercise.name = self.checked_name(actor, name, Some(exercise_id))?;
        }
        if let Some(muscle_group) = &patch.muscle_group {
            exercise.muscle_group = muscle_group.clone();
        }
        if let Some(exercise_type) = &patch.exercise_type {
            exercise.exercise_type = exercise_type.clone();
        }
        if let Some(equipment) = &patch.equipment {
            exercise.equipment = equipment.clone();
        }
        if let Some(notes) = &patch.notes {
            exercise.notes = notes.clone();
        }

        self.conn.execute(
            "UPDATE exercises SET name = ?2, name_key = ?3, muscle_group = ?4, exercise_type = ?5,
                                  equipment = ?6, notes = ?7
             WHERE id = ?1",
            params![
                exercise.id.to_string(),
                exercise.name,
                name_key(&exercise.name),
                exercise.muscle_group,
                exercise.exercise_type,
                exercise.equipment,
                exercise.notes,
            ],
        )?;

        Ok(exercise)
    }

    /// Normalize `raw` and make sure no other exercise of `owner` uses it.
    fn checked_name(&self, owner: Uuid, raw: &str, except: Option<Uuid>) -> Result<String> {
        let name = normalize_name(raw);
        if name.is_empty() {
            return Err(LiftError::Validation("Exercise name is required".to_string()));
        }

        if let Some(existing) = self.find_by_name(owner, &name)? {
            if Some(existing.id) != except {
                return Err(LiftError::Conflict(
                    "Exercise with this name already exists".to_string(),
                ));
            }
        }
        Ok(name)
    }

    /// Case-insensitive lookup in the owner's catalogue.
    pub fn find_by_name(&self, owner: Uuid, name: &str) -> Result<Option<Exercise>> {
        let sql = format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises
             WHERE owner_id = ?1 AND name_key = ?2"
        );
        self.conn
            .query_row(
                &sql,
                params![owner.to_string(), name_key(name)],
                parse_exercise_row,
            )
            .optional()
            .map_err(LiftError::from)
    }

    /// Get an exercise by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<Exercise>> {
        let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_exercise_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Get an exercise the actor owns.
    pub fn require_owned(&self, actor: Uuid, id: Uuid) -> Result<Exercise> {
        let exercise = self.get(id)?.ok_or(LiftError::NotFound("Exercise"))?;
        ensure_owner(exercise.owner_id, actor, "Exercise")?;
        Ok(exercise)
    }

    /// All exercises of an owner, by name.
    pub fn list(&self, owner: Uuid) -> Result<Vec<Exercise>> {
        let sql = format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises WHERE owner_id = ?1 ORDER BY name_key"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let exercises = stmt
            .query_map(params![owner.to_string()], parse_exercise_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exercises)
    }

    /// Exercises for a set of ids; ids that no longer exist are skipped.
    pub fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Exercise>> {
        let mut exercises = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(exercise) = self.get(*id)? {
                exercises.push(exercise);
            }
        }
        Ok(exercises)
    }
}

pub(crate) fn parse_exercise_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: uuid_at(row, 0)?,
        owner_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        muscle_group: row.get(3)?,
        exercise_type: row.get(4)?,
        equipment: row.get(5)?,
        notes: row.get(6)?,
    })
}

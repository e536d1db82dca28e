//! Session lifecycle: start, log sets, finish or cancel.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{FinishedSession, Session, SessionStatus, SessionWithSets, SetDraft, SetLog};
use crate::error::{ensure_owner, LiftError, Result};
use crate::exercises::ExerciseManager;
use crate::programs::ProgramManager;
use crate::records::RecordManager;
use crate::storage::database::{date_at, enum_at, format_date, uuid_at};

const SESSION_COLUMNS: &str =
    "id, owner_id, template_id, program_id, template_name, program_name, date, status";
const SET_COLUMNS: &str = "id, session_id, exercise_id, set_number, weight, reps, rpe, comment";

/// Manager for training sessions.
pub struct SessionManager<'a> {
    conn: &'a Connection,
}

impl<'a> SessionManager<'a> {
    /// Create a new session manager over a connection or transaction.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Start a session from a template, snapshotting template and program names.
    pub fn start(&self, actor: Uuid, template_id: Uuid, date: Option<NaiveDate>) -> Result<Session> {
        let programs = ProgramManager::new(self.conn);
        let template = programs.require_owned_template(actor, template_id)?;
        let program_name = programs
            .get_program(template.program_id)?
            .map(|p| p.name)
            .unwrap_or_default();

        let session = Session {
            id: Uuid::new_v4(),
            owner_id: actor,
            template_id: template.id,
            program_id: template.program_id,
            template_name: template.name,
            program_name,
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            status: SessionStatus::InProgress,
        };

        self.conn.execute(
            "INSERT INTO sessions (id, owner_id, template_id, program_id, template_name,
                                   program_name, date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session.id.to_string(),
                session.owner_id.to_string(),
                session.template_id.to_string(),
                session.program_id.to_string(),
                session.template_name,
                session.program_name,
                format_date(session.date),
                session.status.as_str(),
            ],
        )?;

        tracing::info!("Started session {} from template {}", session.id, session.template_name);
        Ok(session)
    }

    /// Log a set into an in-progress session.
    pub fn log_set(&self, actor: Uuid, session_id: Uuid, draft: &SetDraft) -> Result<SetLog> {
        let session = self.require_owned(actor, session_id)?;
        if session.status != SessionStatus::InProgress {
            return Err(LiftError::Conflict(format!(
                "Session is {}, sets can only be logged while in progress",
                session.status.as_str()
            )));
        }
        if !draft.weight.is_finite() || draft.weight < 0.0 {
            return Err(LiftError::Validation("Weight must be a non-negative number".to_string()));
        }
        if !draft.rpe.is_finite() || draft.rpe < 0.0 {
            return Err(LiftError::Validation("RPE must be a non-negative number".to_string()));
        }
        ExerciseManager::new(self.conn).require_owned(actor, draft.exercise_id)?;

        let set = SetLog {
            id: Uuid::new_v4(),
            session_id: session.id,
            exercise_id: draft.exercise_id,
            set_number: draft.set_number,
            weight: draft.weight,
            reps: draft.reps,
            rpe: draft.rpe,
            comment: draft.comment.clone(),
        };

        self.conn.execute(
            "INSERT INTO set_logs (id, session_id, exercise_id, set_number, weight, reps, rpe, comment)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                set.id.to_string(),
                set.session_id.to_string(),
                set.exercise_id.to_string(),
                set.set_number,
                set.weight,
                set.reps,
                set.rpe,
                set.comment,
            ],
        )?;
        Ok(set)
    }

    /// Mark a session done and derive personal bests from its sets.
    ///
    /// Finishing is one-way: a session that is already done or cancelled is
    /// rejected instead of being derived twice.
    pub fn finish(&self, actor: Uuid, session_id: Uuid) -> Result<FinishedSession> {
        let mut session = self.require_in_progress(actor, session_id)?;

        self.set_status(session.id, SessionStatus::Done)?;
        session.status = SessionStatus::Done;

        let set_logs = self.set_logs_of(session.id)?;
        let personal_bests =
            RecordManager::new(self.conn).derive_and_merge(actor, &session, &set_logs)?;

        tracing::info!("Finished session {} with {} sets", session.id, set_logs.len());
        Ok(FinishedSession {
            session,
            set_logs,
            personal_bests,
        })
    }

    /// Cancel an in-progress session, discarding its sets. No records are derived.
    pub fn cancel(&self, actor: Uuid, session_id: Uuid) -> Result<SessionWithSets> {
        let mut session = self.require_in_progress(actor, session_id)?;

        let discarded = self.delete_set_logs(session.id)?;
        self.set_status(session.id, SessionStatus::Cancelled)?;
        session.status = SessionStatus::Cancelled;

        tracing::info!("Cancelled session {} ({} sets discarded)", session.id, discarded);
        Ok(SessionWithSets {
            session,
            set_logs: Vec::new(),
        })
    }

    fn require_in_progress(&self, actor: Uuid, session_id: Uuid) -> Result<Session> {
        let session = self.require_owned(actor, session_id)?;
        if session.status.is_terminal() {
            return Err(LiftError::Conflict(format!(
                "Session already {}",
                session.status.as_str()
            )));
        }
        Ok(session)
    }

    fn set_status(&self, session_id: Uuid, status: SessionStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE sessions SET status = ?2 WHERE id = ?1",
            params![session_id.to_string(), status.as_str()],
        )?;
        Ok(())
    }

    /// Delete every in-progress session of the actor with its sets.
    pub fn clear_active(&self, actor: Uuid) -> Result<usize> {
        let active: Vec<Uuid> = self
            .list_for_owner(actor, None)?
            .into_iter()
            .filter(|s| s.status == SessionStatus::InProgress)
            .map(|s| s.id)
            .collect();

        for session_id in &active {
            self.delete_set_logs(*session_id)?;
            self.delete_row(*session_id)?;
        }

        tracing::info!("Cleared {} active sessions for {}", active.len(), actor);
        Ok(active.len())
    }

    /// The actor's most recent sessions with their sets, newest date first.
    pub fn list(&self, actor: Uuid, limit: usize) -> Result<Vec<SessionWithSets>> {
        self.list_for_owner(actor, Some(limit))?
            .into_iter()
            .map(|session| {
                let set_logs = self.set_logs_of(session.id)?;
                Ok(SessionWithSets { session, set_logs })
            })
            .collect()
    }

    fn list_for_owner(&self, owner: Uuid, limit: Option<usize>) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE owner_id = ?1
             ORDER BY date DESC, rowid DESC LIMIT ?2"
        );
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params![owner.to_string(), limit], parse_session_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// A session the actor owns, with its sets.
    pub fn get_with_sets(&self, actor: Uuid, session_id: Uuid) -> Result<SessionWithSets> {
        let session = self.require_owned(actor, session_id)?;
        let set_logs = self.set_logs_of(session.id)?;
        Ok(SessionWithSets { session, set_logs })
    }

    /// Get a session by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<Session>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_session_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Get a session the actor owns.
    pub fn require_owned(&self, actor: Uuid, id: Uuid) -> Result<Session> {
        let session = self.get(id)?.ok_or(LiftError::NotFound("Session"))?;
        ensure_owner(session.owner_id, actor, "Session")?;
        Ok(session)
    }

    /// Sets of a session in logging order.
    pub fn set_logs_of(&self, session_id: Uuid) -> Result<Vec<SetLog>> {
        let sql = format!("SELECT {SET_COLUMNS} FROM set_logs WHERE session_id = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let sets = stmt
            .query_map(params![session_id.to_string()], parse_set_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sets)
    }

    /// Sessions started from a program.
    pub(crate) fn session_ids_for_program(&self, program_id: Uuid) -> Result<Vec<Uuid>> {
        self.ids_where("program_id", program_id)
    }

    fn ids_where(&self, column: &str, value: Uuid) -> Result<Vec<Uuid>> {
        let sql = format!("SELECT id FROM sessions WHERE {column} = ?1 ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params![value.to_string()], |row| uuid_at(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    /// Remove all sets of a session; returns how many were removed.
    pub(crate) fn delete_set_logs(&self, session_id: Uuid) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM set_logs WHERE session_id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(removed)
    }

    /// Remove the session row itself; its sets must already be gone.
    pub(crate) fn delete_row(&self, session_id: Uuid) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM sessions WHERE id = ?1",
            params![session_id.to_string()],
        )?;
        Ok(removed)
    }
}

fn parse_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: uuid_at(row, 0)?,
        owner_id: uuid_at(row, 1)?,
        template_id: uuid_at(row, 2)?,
        program_id: uuid_at(row, 3)?,
        template_name: row.get(4)?,
        program_name: row.get(5)?,
        date: date_at(row, 6)?,
        status: enum_at(row, 7)?,
    })
}

fn parse_set_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SetLog> {
    Ok(SetLog {
        id: uuid_at(row, 0)?,
        session_id: uuid_at(row, 1)?,
        exercise_id: uuid_at(row, 2)?,
        set_number: row.get(3)?,
        weight: row.get(4)?,
        reps: row.get(5)?,
        rpe: row.get(6)?,
        comment: row.get(7)?,
    })
}

//! Personal-best derivation and merge.
//!
//! Each set of a finished session yields three candidates which are merged
//! into the owner's records with an update-if-strictly-greater policy, one
//! set at a time in logging order.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{candidates_for, PbCandidate, PbKind, PersonalBest};
use crate::error::{ensure_owner, LiftError, Result};
use crate::exercises::ExerciseManager;
use crate::sessions::{Session, SessionManager, SessionStatus, SetLog};
use crate::storage::database::{date_at, enum_at, format_date, uuid_at};

const PB_COLUMNS: &str =
    "id, owner_id, exercise_id, kind, label, value, reps, date, set_log_id, is_public";

/// What a single merge did.
#[derive(Debug, Clone, PartialEq)]
enum MergeOutcome {
    Inserted(PersonalBest),
    Improved(PersonalBest),
    Kept,
}

/// Manager for personal-best records.
pub struct RecordManager<'a> {
    conn: &'a Connection,
}

impl<'a> RecordManager<'a> {
    /// Create a new record manager over a connection or transaction.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Merge every set of a finished `session` into the owner's records.
    ///
    /// The session is re-read from storage and must be done. Every set is
    /// checked before anything is merged. Returns each inserted or improved
    /// record once, in its final state.
    pub fn derive_and_merge(
        &self,
        owner: Uuid,
        session: &Session,
        set_logs: &[SetLog],
    ) -> Result<Vec<PersonalBest>> {
        ensure_owner(session.owner_id, owner, "Session")?;
        let session = SessionManager::new(self.conn).require_owned(owner, session.id)?;
        if session.status != SessionStatus::Done {
            return Err(LiftError::Conflict(format!(
                "Session is {}; records come from finished sessions",
                session.status.as_str()
            )));
        }

        let exercises = ExerciseManager::new(self.conn);
        for set in set_logs {
            self.check_set(owner, &session, set, &exercises)?;
        }

        let mut changed: Vec<PersonalBest> = Vec::new();

        for set in set_logs {
            for candidate in candidates_for(set) {
                let record = match self.merge(owner, &session, set, &candidate)? {
                    MergeOutcome::Inserted(pb) | MergeOutcome::Improved(pb) => pb,
                    MergeOutcome::Kept => continue,
                };

                match changed.iter_mut().find(|pb| pb.id == record.id) {
                    Some(existing) => *existing = record,
                    None => changed.push(record),
                }
            }
        }

        tracing::info!(
            "Session {} produced {} new or improved personal bests",
            session.id,
            changed.len()
        );
        Ok(changed)
    }

    fn check_set(
        &self,
        owner: Uuid,
        session: &Session,
        set: &SetLog,
        exercises: &ExerciseManager<'_>,
    ) -> Result<()> {
        if set.session_id != session.id {
            return Err(LiftError::Validation(format!(
                "Set {} belongs to session {}, not {}",
                set.id, set.session_id, session.id
            )));
        }
        if !set.weight.is_finite() || set.weight < 0.0 {
            return Err(LiftError::Validation(format!("Set {} has an invalid weight", set.id)));
        }

        let logged: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM set_logs WHERE id = ?1 AND session_id = ?2)",
            params![set.id.to_string(), session.id.to_string()],
            |row| row.get(0),
        )?;
        if !logged {
            return Err(LiftError::Validation(format!(
                "Set {} was not logged in session {}",
                set.id, session.id
            )));
        }

        exercises.require_owned(owner, set.exercise_id)?;
        Ok(())
    }

    /// Merge one candidate; ties keep the existing, earlier record.
    fn merge(
        &self,
        owner: Uuid,
        session: &Session,
        set: &SetLog,
        candidate: &PbCandidate,
    ) -> Result<MergeOutcome> {
        let existing = self.find(owner, set.exercise_id, candidate.kind, candidate.reps)?;

        match existing {
            None => {
                let pb = PersonalBest {
                    id: Uuid::new_v4(),
                    owner_id: owner,
                    exercise_id: set.exercise_id,
                    kind: candidate.kind,
                    label: candidate.label.clone(),
                    value: candidate.value,
                    reps: candidate.reps,
                    date: session.date,
                    set_log_id: set.id,
                    is_public: false,
                };
                self.insert(&pb)?;
                Ok(MergeOutcome::Inserted(pb))
            }
            Some(mut pb) if candidate.value > pb.value => {
                tracing::debug!(
                    "{} for exercise {} improved {} -> {}",
                    pb.kind,
                    pb.exercise_id,
                    pb.value,
                    candidate.value
                );
                pb.value = candidate.value;
                pb.reps = candidate.reps;
                pb.date = session.date;
                pb.set_log_id = set.id;
                pb.label = candidate.label.clone();

                self.conn.execute(
                    "UPDATE personal_bests SET value = ?2, reps = ?3, date = ?4,
                                               set_log_id = ?5, label = ?6
                     WHERE id = ?1",
                    params![
                        pb.id.to_string(),
                        pb.value,
                        pb.reps,
                        format_date(pb.date),
                        pb.set_log_id.to_string(),
                        pb.label,
                    ],
                )?;
                Ok(MergeOutcome::Improved(pb))
            }
            Some(_) => Ok(MergeOutcome::Kept),
        }
    }

    fn insert(&self, pb: &PersonalBest) -> Result<()> {
        self.conn.execute(
            "INSERT INTO personal_bests (id, owner_id, exercise_id, kind, rep_key, label, value,
                                         reps, date, set_log_id, is_public)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                pb.id.to_string(),
                pb.owner_id.to_string(),
                pb.exercise_id.to_string(),
                pb.kind.as_str(),
                pb.kind.rep_key(pb.reps),
                pb.label,
                pb.value,
                pb.reps,
                format_date(pb.date),
                pb.set_log_id.to_string(),
                pb.is_public,
            ],
        )?;
        Ok(())
    }

    /// Look up the record for a key. `reps` only matters for rep-keyed kinds.
    pub fn find(
        &self,
        owner: Uuid,
        exercise_id: Uuid,
        kind: PbKind,
        reps: u32,
    ) -> Result<Option<PersonalBest>> {
        let sql = format!(
            "SELECT {PB_COLUMNS} FROM personal_bests
             WHERE owner_id = ?1 AND exercise_id = ?2 AND kind = ?3 AND rep_key = ?4"
        );
        self.conn
            .query_row(
                &sql,
                params![
                    owner.to_string(),
                    exercise_id.to_string(),
                    kind.as_str(),
                    kind.rep_key(reps),
                ],
                parse_pb_row,
            )
            .optional()
            .map_err(LiftError::from)
    }

    /// The owner's records, optionally narrowed by exercise and rep count.
    pub fn list(
        &self,
        owner: Uuid,
        exercise_id: Option<Uuid>,
        reps: Option<u32>,
        public_only: bool,
    ) -> Result<Vec<PersonalBest>> {
        let mut sql = format!("SELECT {PB_COLUMNS} FROM personal_bests WHERE owner_id = ?1");
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner.to_string())];

        if let Some(exercise_id) = exercise_id {
            args.push(Box::new(exercise_id.to_string()));
            sql.push_str(&format!(" AND exercise_id = ?{}", args.len()));
        }
        if let Some(reps) = reps {
            args.push(Box::new(reps));
            sql.push_str(&format!(" AND reps = ?{}", args.len()));
        }
        if public_only {
            sql.push_str(" AND is_public = 1");
        }
        sql.push_str(" ORDER BY exercise_id, kind, rep_key");

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                parse_pb_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Get a record by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<PersonalBest>> {
        let sql = format!("SELECT {PB_COLUMNS} FROM personal_bests WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_pb_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Share or unshare a record.
    pub fn publish(&self, actor: Uuid, pb_id: Uuid, is_public: bool) -> Result<PersonalBest> {
        let mut pb = self.get(pb_id)?.ok_or(LiftError::NotFound("Personal best"))?;
        ensure_owner(pb.owner_id, actor, "Personal best")?;

        self.conn.execute(
            "UPDATE personal_bests SET is_public = ?2 WHERE id = ?1",
            params![pb.id.to_string(), is_public],
        )?;
        pb.is_public = is_public;
        Ok(pb)
    }
}

fn parse_pb_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PersonalBest> {
    Ok(PersonalBest {
        id: uuid_at(row, 0)?,
        owner_id: uuid_at(row, 1)?,
        exercise_id: uuid_at(row, 2)?,
        kind: enum_at(row, 3)?,
        label: row.get(4)?,
        value: row.get(5)?,
        reps: row.get(6)?,
        date: date_at(row, 7)?,
        set_log_id: uuid_at(row, 8)?,
        is_public: row.get(9)?,
    })
}

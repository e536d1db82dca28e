//! The logbook facade.
//!
//! Every operation takes the acting user explicitly and runs as one unit of
//! work: writes go through an immediate transaction that commits only when
//! the whole operation succeeds.

use std::path::Path;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{LiftError, Result};
use crate::exercises::{Exercise, ExerciseDraft, ExerciseManager, ExercisePatch};
use crate::programs::{
    CascadeManager, CascadeReport, CopyOverrides, Program, ProgramDetail, ProgramDraft,
    ProgramManager, ProgramPatch, ProgramTree, RowDraft, RowIssue, RowPatch, TemplateRow,
    TemplateWithRows, WorkoutTemplate,
};
use crate::records::{PersonalBest, RecordManager};
use crate::sessions::{FinishedSession, Session, SessionManager, SessionWithSets, SetDraft, SetLog};
use crate::social::{Decision, FriendManager, FriendRequest, RequestView, SharingManager};
use crate::storage::{AppConfig, Database};
use crate::users::{PublicProfile, User, UserManager};

/// Training log over one SQLite database.
pub struct Logbook {
    db: Database,
    session_list_limit: usize,
}

impl Logbook {
    /// Open the database configured in `config`.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let path = config.database_path();
        let mut logbook = Self::open_path(&path)?;
        logbook.session_list_limit = config.sessions.default_list_limit;
        Ok(logbook)
    }

    /// Open or create a database file.
    pub fn open_path(path: &Path) -> Result<Self> {
        Ok(Self::with_database(Database::open(path)?))
    }

    /// Logbook over an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_database(Database::open_in_memory()?))
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            session_list_limit: AppConfig::default().sessions.default_list_limit,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    fn write<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T>,
    {
        self.db.with_transaction(|tx| f(tx))
    }

    fn read(&self) -> &rusqlite::Connection {
        self.db.connection()
    }

    // ========== Users ==========

    pub fn register_user(&mut self, email: &str, username: &str, display_name: &str) -> Result<User> {
        self.write(|conn| UserManager::new(conn).register(email, username, display_name))
    }

    pub fn get_user(&self, id: Uuid) -> Result<User> {
        UserManager::new(self.read()).require(id)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        UserManager::new(self.read()).find_by_username(username)
    }

    pub fn public_profile(&self, username: &str) -> Result<PublicProfile> {
        UserManager::new(self.read()).public_profile(username)
    }

    pub fn update_display_name(&mut self, actor: Uuid, display_name: &str) -> Result<User> {
        self.write(|conn| UserManager::new(conn).update_display_name(actor, display_name))
    }

    // ========== Exercises ==========

    pub fn create_exercise(&mut self, actor: Uuid, draft: &ExerciseDraft) -> Result<Exercise> {
        self.write(|conn| ExerciseManager::new(conn).create(actor, draft))
    }

    pub fn update_exercise(&mut self, actor: Uuid, exercise_id: Uuid, patch: &ExercisePatch) -> Result<Exercise> {
        self.write(|conn| ExerciseManager::new(conn).update(actor, exercise_id, patch))
    }

    /// Delete an exercise with every row, set log and record that uses it.
    pub fn delete_exercise(&mut self, actor: Uuid, exercise_id: Uuid) -> Result<CascadeReport> {
        self.write(|conn| CascadeManager::new(conn).delete_exercise(actor, exercise_id))
    }

    pub fn get_exercise(&self, actor: Uuid, exercise_id: Uuid) -> Result<Exercise> {
        ExerciseManager::new(self.read()).require_owned(actor, exercise_id)
    }

    pub fn list_exercises(&self, actor: Uuid) -> Result<Vec<Exercise>> {
        ExerciseManager::new(self.read()).list(actor)
    }

    // ========== Programs ==========

    pub fn create_program(&mut self, actor: Uuid, draft: &ProgramDraft) -> Result<Program> {
        self.write(|conn| ProgramManager::new(conn).create_program(actor, draft))
    }

    pub fn update_program(&mut self, actor: Uuid, program_id: Uuid, patch: &ProgramPatch) -> Result<Program> {
        self.write(|conn| ProgramManager::new(conn).update_program(actor, program_id, patch))
    }

    /// A program the viewer owns or that is public.
    pub fn get_program(&self, viewer: Uuid, program_id: Uuid) -> Result<Program> {
        let program = ProgramManager::new(self.read()).require_program(program_id)?;
        if !program.is_visible_to(viewer) {
            return Err(LiftError::Authorization("Program is not public".to_string()));
        }
        Ok(program)
    }

    pub fn list_programs(&self, actor: Uuid) -> Result<Vec<Program>> {
        ProgramManager::new(self.read()).list_programs(actor, false)
    }

    /// Delete a program with its templates, rows, sessions and set logs.
    pub fn cascade_delete_program(&mut self, actor: Uuid, program_id: Uuid) -> Result<CascadeReport> {
        self.write(|conn| CascadeManager::new(conn).delete_program(actor, program_id))
    }

    /// Duplicate one of the actor's programs as a new version.
    pub fn copy_program(
        &mut self,
        actor: Uuid,
        source_program_id: Uuid,
        overrides: &CopyOverrides,
    ) -> Result<ProgramTree> {
        self.write(|conn| CascadeManager::new(conn).copy_program(actor, source_program_id, overrides))
    }

    /// Deep-copy a public program, and the exercises it uses, into the
    /// target owner's account.
    pub fn fork_program(&mut self, target_owner: Uuid, source_program_id: Uuid) -> Result<ProgramTree> {
        self.write(|conn| {
            CascadeManager::new(conn)
                .fork_program(target_owner, source_program_id)
                .map(|forked| forked.tree)
        })
    }

    // ========== Templates & Rows ==========

    pub fn create_template(&mut self, actor: Uuid, program_id: Uuid, name: &str) -> Result<WorkoutTemplate> {
        self.write(|conn| ProgramManager::new(conn).create_template(actor, program_id, name))
    }

    pub fn update_template(
        &mut self,
        actor: Uuid,
        template_id: Uuid,
        name: Option<&str>,
        program_id: Option<Uuid>,
    ) -> Result<WorkoutTemplate> {
        self.write(|conn| ProgramManager::new(conn).update_template(actor, template_id, name, program_id))
    }

    pub fn delete_template(&mut self, actor: Uuid, template_id: Uuid) -> Result<CascadeReport> {
        self.write(|conn| CascadeManager::new(conn).delete_template(actor, template_id))
    }

    pub fn list_templates(&self, actor: Uuid, program_id: Option<Uuid>) -> Result<Vec<TemplateWithRows>> {
        ProgramManager::new(self.read()).list_templates(actor, program_id)
    }

    pub fn add_row(&mut self, actor: Uuid, template_id: Uuid, draft: &RowDraft) -> Result<TemplateRow> {
        self.write(|conn| ProgramManager::new(conn).add_row(actor, template_id, draft))
    }

    pub fn update_row(
        &mut self,
        actor: Uuid,
        template_id: Uuid,
        row_id: Uuid,
        patch: &RowPatch,
    ) -> Result<TemplateRow> {
        self.write(|conn| ProgramManager::new(conn).update_row(actor, template_id, row_id, patch))
    }

    pub fn delete_row(&mut self, actor: Uuid, template_id: Uuid, row_id: Uuid) -> Result<CascadeReport> {
        self.write(|conn| CascadeManager::new(conn).delete_row(actor, template_id, row_id))
    }

    /// Rows of the owner's templates whose exercise is missing or foreign.
    pub fn audit_template_rows(&self, owner: Uuid) -> Result<Vec<RowIssue>> {
        ProgramManager::new(self.read()).audit_rows(owner)
    }

    // ========== Sessions ==========

    pub fn start_session(&mut self, actor: Uuid, template_id: Uuid, date: Option<NaiveDate>) -> Result<Session> {
        self.write(|conn| SessionManager::new(conn).start(actor, template_id, date))
    }

    pub fn log_set(&mut self, actor: Uuid, session_id: Uuid, draft: &SetDraft) -> Result<SetLog> {
        self.write(|conn| SessionManager::new(conn).log_set(actor, session_id, draft))
    }

    /// Finish a session and merge its sets into the actor's personal bests.
    pub fn finish_session(&mut self, actor: Uuid, session_id: Uuid) -> Result<FinishedSession> {
        self.write(|conn| SessionManager::new(conn).finish(actor, session_id))
    }

    pub fn cancel_session(&mut self, actor: Uuid, session_id: Uuid) -> Result<SessionWithSets> {
        self.write(|conn| SessionManager::new(conn).cancel(actor, session_id))
    }

    pub fn delete_session(&mut self, actor: Uuid, session_id: Uuid) -> Result<CascadeReport> {
        self.write(|conn| CascadeManager::new(conn).delete_session(actor, session_id))
    }

    pub fn clear_active_sessions(&mut self, actor: Uuid) -> Result<usize> {
        self.write(|conn| SessionManager::new(conn).clear_active(actor))
    }

    /// Most recent sessions first; `limit` defaults to the configured one.
    pub fn list_sessions(&self, actor: Uuid, limit: Option<usize>) -> Result<Vec<SessionWithSets>> {
        SessionManager::new(self.read()).list(actor, limit.unwrap_or(self.session_list_limit))
    }

    pub fn get_session(&self, actor: Uuid, session_id: Uuid) -> Result<SessionWithSets> {
        SessionManager::new(self.read()).get_with_sets(actor, session_id)
    }

    // ========== Personal Bests ==========

    /// Merge `set_logs` of a finished session into the owner's records.
    /// Finishing a session does this already; merging the same sets twice
    /// changes nothing. Sets must have been logged in `session` against the
    /// owner's exercises.
    pub fn derive_and_merge_personal_bests(
        &mut self,
        owner: Uuid,
        session: &Session,
        set_logs: &[SetLog],
    ) -> Result<Vec<PersonalBest>> {
        self.write(|conn| RecordManager::new(conn).derive_and_merge(owner, session, set_logs))
    }

    pub fn list_personal_bests(
        &self,
        owner: Uuid,
        exercise_id: Option<Uuid>,
        reps: Option<u32>,
    ) -> Result<Vec<PersonalBest>> {
        RecordManager::new(self.read()).list(owner, exercise_id, reps, false)
    }

    pub fn publish_personal_best(&mut self, actor: Uuid, pb_id: Uuid, is_public: bool) -> Result<PersonalBest> {
        self.write(|conn| SharingManager::new(conn).publish_personal_best(actor, pb_id, is_public))
    }

    // ========== Friends ==========

    pub fn send_friend_request(&mut self, from: Uuid, to_username: &str) -> Result<FriendRequest> {
        self.write(|conn| FriendManager::new(conn).send_request(from, to_username))
    }

    pub fn respond_friend_request(
        &mut self,
        request_id: Uuid,
        by_user: Uuid,
        decision: Decision,
    ) -> Result<FriendRequest> {
        self.write(|conn| FriendManager::new(conn).respond(request_id, by_user, decision))
    }

    pub fn list_incoming_requests(&self, user: Uuid) -> Result<Vec<RequestView>> {
        FriendManager::new(self.read()).list_incoming(user)
    }

    pub fn list_outgoing_requests(&self, user: Uuid) -> Result<Vec<RequestView>> {
        FriendManager::new(self.read()).list_outgoing(user)
    }

    pub fn list_friends(&self, user: Uuid) -> Result<Vec<PublicProfile>> {
        FriendManager::new(self.read()).list_friends(user)
    }

    // ========== Sharing ==========

    pub fn publish_program(&mut self, actor: Uuid, program_id: Uuid, is_public: bool) -> Result<Program> {
        self.write(|conn| SharingManager::new(conn).publish_program(actor, program_id, is_public))
    }

    pub fn list_user_programs(&self, viewer: Uuid, username: &str) -> Result<Vec<Program>> {
        SharingManager::new(self.read()).list_user_programs(viewer, username)
    }

    /// Program of `username` with templates and rows joined to exercises.
    pub fn program_tree(&self, viewer: Uuid, username: &str, program_id: Uuid) -> Result<ProgramDetail> {
        SharingManager::new(self.read()).program_detail(viewer, username, program_id)
    }

    pub fn list_user_personal_bests(
        &self,
        viewer: Uuid,
        username: &str,
        exercise_id: Option<Uuid>,
    ) -> Result<Vec<PersonalBest>> {
        SharingManager::new(self.read()).list_user_personal_bests(viewer, username, exercise_id)
    }
}

//! Publishing programs and personal bests, and reading what others share.

use rusqlite::Connection;
use uuid::Uuid;

use crate::error::{LiftError, Result};
use crate::programs::{Program, ProgramDetail, ProgramManager, ProgramPatch, Visibility};
use crate::records::{PersonalBest, RecordManager};
use crate::users::UserManager;

/// Read and publish shared content.
pub struct SharingManager<'a> {
    conn: &'a Connection,
}

impl<'a> SharingManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Make a program public, or private again.
    pub fn publish_program(&self, actor: Uuid, program_id: Uuid, is_public: bool) -> Result<Program> {
        let visibility = if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        };
        let patch = ProgramPatch {
            visibility: Some(visibility),
            ..Default::default()
        };
        let program = ProgramManager::new(self.conn).update_program(actor, program_id, &patch)?;

        tracing::info!("Program {} is now {}", program.name, visibility.as_str());
        Ok(program)
    }

    /// Share or unshare a personal best.
    pub fn publish_personal_best(&self, actor: Uuid, pb_id: Uuid, is_public: bool) -> Result<PersonalBest> {
        RecordManager::new(self.conn).publish(actor, pb_id, is_public)
    }

    /// Programs of `username` that `viewer` may see.
    pub fn list_user_programs(&self, viewer: Uuid, username: &str) -> Result<Vec<Program>> {
        let owner = UserManager::new(self.conn).require_by_username(username)?;
        ProgramManager::new(self.conn).list_programs(owner.id, owner.id != viewer)
    }

    /// Full program of `username`, rows joined with their exercises.
    pub fn program_detail(&self, viewer: Uuid, username: &str, program_id: Uuid) -> Result<ProgramDetail> {
        let owner = UserManager::new(self.conn).require_by_username(username)?;
        let programs = ProgramManager::new(self.conn);

        let program = programs.require_program(program_id)?;
        if program.owner_id != owner.id {
            return Err(LiftError::NotFound("Program"));
        }
        if !program.is_visible_to(viewer) {
            return Err(LiftError::Authorization("Program is not public".to_string()));
        }

        programs.load_detail(program)
    }

    /// Personal bests of `username` that `viewer` may see.
    pub fn list_user_personal_bests(
        &self,
        viewer: Uuid,
        username: &str,
        exercise_id: Option<Uuid>,
    ) -> Result<Vec<PersonalBest>> {
        let owner = UserManager::new(self.conn).require_by_username(username)?;
        RecordManager::new(self.conn).list(owner.id, exercise_id, None, owner.id != viewer)
    }
}

//! Error taxonomy shared by every logbook operation.

use crate::storage::DatabaseError;
use rusqlite::ErrorCode;

/// Outcome category a transport layer maps to a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Authorization,
    Conflict,
    Validation,
    Internal,
}

/// Errors raised by logbook operations.
///
/// Every variant aborts only the current unit of work.
#[derive(Debug, thiserror::Error)]
pub enum LiftError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not allowed: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl LiftError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LiftError::NotFound(_) => ErrorKind::NotFound,
            LiftError::Authorization(_) => ErrorKind::Authorization,
            LiftError::Conflict(_) => ErrorKind::Conflict,
            LiftError::Validation(_) => ErrorKind::Validation,
            LiftError::Database(_) | LiftError::Storage(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_owner(what: &str) -> Self {
        LiftError::Authorization(format!("{what} belongs to another user"))
    }
}

impl From<rusqlite::Error> for LiftError {
    fn from(err: rusqlite::Error) -> Self {
        // Uniqueness and check constraints are the store's half of the
        // conflict rules; surface them the same way as the engine's checks.
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == ErrorCode::ConstraintViolation
                    && !is_foreign_key_violation(msg.as_deref()) =>
            {
                LiftError::Conflict(msg.clone().unwrap_or_else(|| "constraint violation".into()))
            }
            _ => LiftError::Database(err),
        }
    }
}

/// Fail with `Authorization` unless `actor` owns the record.
pub(crate) fn ensure_owner(owner_id: uuid::Uuid, actor: uuid::Uuid, what: &str) -> Result<()> {
    if owner_id != actor {
        return Err(LiftError::not_owner(what));
    }
    Ok(())
}

fn is_foreign_key_violation(msg: Option<&str>) -> bool {
    msg.is_some_and(|m| m.contains("FOREIGN KEY"))
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LiftError>;

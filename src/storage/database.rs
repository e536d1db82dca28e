//! Database operations using rusqlite.
//!
//! Owns the SQLite connection, schema creation and versioned migration, and
//! the unit-of-work wrapper every logbook operation runs inside.

use crate::storage::schema::{CURRENT_VERSION, MIGRATION_V1_TO_V2, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result as SqliteResult, Transaction, TransactionBehavior};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Calendar date format used for session and PB dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        tracing::debug!("Opened database at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    pub fn schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.apply_migration(1, SCHEMA)?;
        }

        if from_version < 2 {
            self.apply_migration(2, MIGRATION_V1_TO_V2)?;
        }

        tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        Ok(())
    }

    fn apply_migration(&self, version: i32, sql: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                [version],
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        tracing::debug!("Applied schema migration {}", version);
        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside one immediate transaction.
    ///
    /// The transaction commits only when `f` returns `Ok`; any error drops it,
    /// which rolls back every write made through it. Immediate mode takes the
    /// SQLite write lock up front, so concurrent writers are serialized.
    pub fn with_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let value = f(&tx)?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(value)
    }

    /// Count registered users; doubles as a readiness check.
    pub fn count_users(&self) -> Result<i64, DatabaseError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }
}

/// Database error types.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

// ========== Column decoding helpers ==========

/// Read a hyphenated UUID stored as text.
pub(crate) fn uuid_at(row: &rusqlite::Row<'_>, idx: usize) -> SqliteResult<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read an RFC 3339 timestamp.
pub(crate) fn timestamp_at(row: &rusqlite::Row<'_>, idx: usize) -> SqliteResult<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a `%Y-%m-%d` calendar date.
pub(crate) fn date_at(row: &rusqlite::Row<'_>, idx: usize) -> SqliteResult<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a text column into any enum with a `FromStr` impl.
pub(crate) fn enum_at<T>(row: &rusqlite::Row<'_>, idx: usize) -> SqliteResult<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Error for a stored enum value that no variant matches.
#[derive(Debug, Error)]
#[error("unknown {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Format a date the way it is stored.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

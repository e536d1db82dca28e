//! User registration and lookup.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{is_valid_username, PublicProfile, User};
use crate::error::{LiftError, Result};
use crate::storage::database::{timestamp_at, uuid_at};

const USER_COLUMNS: &str = "id, email, username, display_name, created_at";

/// Manager for user records.
pub struct UserManager<'a> {
    conn: &'a Connection,
}

impl<'a> UserManager<'a> {
    /// Create a new user manager over a connection or transaction.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Register a new user.
    pub fn register(&self, email: &str, username: &str, display_name: &str) -> Result<User> {
        let email = email.trim();
        let display_name = display_name.trim();

        if email.is_empty() || !email.contains('@') {
            return Err(LiftError::Validation("A valid email is required".to_string()));
        }
        if !is_valid_username(username) {
            return Err(LiftError::Validation(
                "Username must be 3-30 chars and contain only letters, numbers or _".to_string(),
            ));
        }
        if display_name.is_empty() {
            return Err(LiftError::Validation("Display name is required".to_string()));
        }

        if self.exists("email", email)? {
            return Err(LiftError::Conflict("Email already registered".to_string()));
        }
        if self.exists("username", username)? {
            return Err(LiftError::Conflict("Username already taken".to_string()));
        }

        let user = User::new(
            email.to_string(),
            username.to_string(),
            display_name.to_string(),
        );

        self.conn.execute(
            "INSERT INTO users (id, email, username, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.email,
                user.username,
                user.display_name,
                user.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!("Registered user {}", user.username);
        Ok(user)
    }

    fn exists(&self, column: &str, value: &str) -> Result<bool> {
        let sql = format!("SELECT 1 FROM users WHERE {column} = ?1");
        let found = self
            .conn
            .query_row(&sql, params![value], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Get a user by ID.
    pub fn get(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_user_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Get a user by ID, failing with `NotFound` when absent.
    pub fn require(&self, id: Uuid) -> Result<User> {
        self.get(id)?.ok_or(LiftError::NotFound("User"))
    }

    /// Find a user by exact username.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
        self.conn
            .query_row(&sql, params![username], parse_user_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Find a user by username, failing with `NotFound` when absent.
    pub fn require_by_username(&self, username: &str) -> Result<User> {
        self.find_by_username(username)?
            .ok_or(LiftError::NotFound("User"))
    }

    /// Public profile for a username.
    pub fn public_profile(&self, username: &str) -> Result<PublicProfile> {
        Ok(self.require_by_username(username)?.public_profile())
    }

    /// Public profiles for a set of ids, in the given order; unknown ids are skipped.
    pub fn profiles(&self, ids: &[Uuid]) -> Result<Vec<PublicProfile>> {
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.get(*id)? {
                profiles.push(user.public_profile());
            }
        }
        Ok(profiles)
    }

    /// Change the display name, the one mutable user field.
    pub fn update_display_name(&self, actor: Uuid, display_name: &str) -> Result<User> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(LiftError::Validation("Display name is required".to_string()));
        }

        let mut user = self.require(actor)?;
        self.conn.execute(
            "UPDATE users SET display_name = ?2 WHERE id = ?1",
            params![actor.to_string(), display_name],
        )?;
        user.display_name = display_name.to_string();
        Ok(user)
    }
}

fn parse_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        display_name: row.get(3)?,
        created_at: timestamp_at(row, 4)?,
    })
}

//! Friend request state machine and friendship storage.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::types::{canonical_pair, Decision, FriendRequest, Friendship, RequestStatus, RequestView};
use crate::error::{LiftError, Result};
use crate::storage::database::{enum_at, timestamp_at, uuid_at};
use crate::users::{PublicProfile, UserManager};

const REQUEST_COLUMNS: &str = "id, from_user_id, to_user_id, status, created_at";

/// Manager for friend requests and friendships.
pub struct FriendManager<'a> {
    conn: &'a Connection,
}

impl<'a> FriendManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========== Requests ==========

    /// Send a request from `from` to the user named `to_username`.
    pub fn send_request(&self, from: Uuid, to_username: &str) -> Result<FriendRequest> {
        let users = UserManager::new(self.conn);
        users.require(from)?;
        let to = users.require_by_username(to_username)?;

        if to.id == from {
            return Err(LiftError::Conflict("Cannot send a friend request to yourself".to_string()));
        }
        if self.are_friends(from, to.id)? {
            return Err(LiftError::Conflict("You are already friends".to_string()));
        }
        if self.pending_between(from, to.id)?.is_some() {
            return Err(LiftError::Conflict("Request already pending".to_string()));
        }

        let request = FriendRequest::new(from, to.id);
        self.conn.execute(
            "INSERT INTO friend_requests (id, from_user_id, to_user_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                request.id.to_string(),
                request.from_user_id.to_string(),
                request.to_user_id.to_string(),
                request.status.as_str(),
                request.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!("Friend request {} sent to {}", request.id, to.username);
        Ok(request)
    }

    /// Accept or reject a pending request addressed to `by_user`.
    pub fn respond(&self, request_id: Uuid, by_user: Uuid, decision: Decision) -> Result<FriendRequest> {
        let mut request = self
            .get_request(request_id)?
            .ok_or(LiftError::NotFound("Friend request"))?;

        if request.to_user_id != by_user {
            return Err(LiftError::Authorization(
                "Only the recipient can answer a friend request".to_string(),
            ));
        }
        if request.status != RequestStatus::Pending {
            return Err(LiftError::Conflict(format!(
                "Request already {}",
                request.status.as_str()
            )));
        }

        request.status = decision.outcome();
        self.conn.execute(
            "UPDATE friend_requests SET status = ?2 WHERE id = ?1",
            params![request.id.to_string(), request.status.as_str()],
        )?;

        if decision == Decision::Accept {
            self.ensure_friendship(request.from_user_id, request.to_user_id)?;
        }

        tracing::info!("Friend request {} {}", request.id, request.status.as_str());
        Ok(request)
    }

    /// Get a request by ID.
    pub fn get_request(&self, id: Uuid) -> Result<Option<FriendRequest>> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM friend_requests WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_request_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Pending request between two users, in either direction.
    pub fn pending_between(&self, a: Uuid, b: Uuid) -> Result<Option<FriendRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests
             WHERE status = 'pending'
               AND ((from_user_id = ?1 AND to_user_id = ?2)
                 OR (from_user_id = ?2 AND to_user_id = ?1))
             LIMIT 1"
        );
        self.conn
            .query_row(&sql, params![a.to_string(), b.to_string()], parse_request_row)
            .optional()
            .map_err(LiftError::from)
    }

    /// Pending requests addressed to `user`, with the sender's profile.
    pub fn list_incoming(&self, user: Uuid) -> Result<Vec<RequestView>> {
        let requests = self.pending_where("to_user_id", user)?;
        self.with_counterparts(requests, |r| r.from_user_id)
    }

    /// Pending requests sent by `user`, with the recipient's profile.
    pub fn list_outgoing(&self, user: Uuid) -> Result<Vec<RequestView>> {
        let requests = self.pending_where("from_user_id", user)?;
        self.with_counterparts(requests, |r| r.to_user_id)
    }

    fn pending_where(&self, column: &str, user: Uuid) -> Result<Vec<FriendRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests
             WHERE {column} = ?1 AND status = 'pending'
             ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let requests = stmt
            .query_map(params![user.to_string()], parse_request_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(requests)
    }

    fn with_counterparts<F>(&self, requests: Vec<FriendRequest>, other_party: F) -> Result<Vec<RequestView>>
    where
        F: Fn(&FriendRequest) -> Uuid,
    {
        let users = UserManager::new(self.conn);
        requests
            .into_iter()
            .map(|request| {
                let counterpart = users.get(other_party(&request))?.map(|u| u.public_profile());
                Ok(RequestView { request, counterpart })
            })
            .collect()
    }

    // ========== Friendships ==========

    /// Insert the canonical edge for a pair unless it already exists.
    fn ensure_friendship(&self, a: Uuid, b: Uuid) -> Result<()> {
        if a == b {
            return Err(LiftError::Conflict("Cannot befriend yourself".to_string()));
        }
        let (user_id, friend_id) = canonical_pair(a, b);
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO friendships (id, user_id, friend_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                friend_id.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if inserted == 0 {
            tracing::debug!("Friendship {} / {} already present", user_id, friend_id);
        }
        Ok(())
    }

    /// Whether the pair is already connected.
    pub fn are_friends(&self, a: Uuid, b: Uuid) -> Result<bool> {
        let (user_id, friend_id) = canonical_pair(a, b);
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM friendships WHERE user_id = ?1 AND friend_id = ?2",
            params![user_id.to_string(), friend_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Friendship rows in which `user` appears on either side.
    pub fn friendships_of(&self, user: Uuid) -> Result<Vec<Friendship>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, friend_id, created_at FROM friendships
             WHERE user_id = ?1 OR friend_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let links = stmt
            .query_map(params![user.to_string()], |row| {
                Ok(Friendship {
                    id: uuid_at(row, 0)?,
                    user_id: uuid_at(row, 1)?,
                    friend_id: uuid_at(row, 2)?,
                    created_at: timestamp_at(row, 3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    /// Public profiles of everyone `user` is friends with.
    pub fn list_friends(&self, user: Uuid) -> Result<Vec<PublicProfile>> {
        let ids: Vec<Uuid> = self
            .friendships_of(user)?
            .iter()
            .map(|link| link.other(user))
            .collect();
        UserManager::new(self.conn).profiles(&ids)
    }
}

fn parse_request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FriendRequest> {
    Ok(FriendRequest {
        id: uuid_at(row, 0)?,
        from_user_id: uuid_at(row, 1)?,
        to_user_id: uuid_at(row, 2)?,
        status: enum_at(row, 3)?,
        created_at: timestamp_at(row, 4)?,
    })
}

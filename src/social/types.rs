//! Core types for friendships and friend requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::storage::database::UnknownVariant;
use crate::users::PublicProfile;

/// Friend request lifecycle. Accepted and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(UnknownVariant::new("request status", other)),
        }
    }
}

/// Answer to a pending friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    /// Status the request moves to.
    pub fn outcome(&self) -> RequestStatus {
        match self {
            Decision::Accept => RequestStatus::Accepted,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// A directed friend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl FriendRequest {
    pub fn new(from_user_id: Uuid, to_user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_user_id,
            to_user_id,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A pending request with the other party's public profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestView {
    pub request: FriendRequest,
    /// Sender for incoming requests, recipient for outgoing ones
    pub counterpart: Option<PublicProfile>,
}

/// Undirected friendship, stored once per pair with `user_id < friend_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// The endpoint that isn't `user`.
    pub fn other(&self, user: Uuid) -> Uuid {
        if self.user_id == user {
            self.friend_id
        } else {
            self.user_id
        }
    }
}

/// Order a pair the way friendships are stored.
///
/// Uuid ordering is byte order, which matches the ordering of their
/// lowercase hyphenated text in the store.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

//! Social features: friend requests, friendships and shared content.

pub mod manager;
pub mod sharing;
pub mod types;

pub use manager::FriendManager;
pub use sharing::SharingManager;
pub use types::{canonical_pair, Decision, FriendRequest, Friendship, RequestStatus, RequestView};

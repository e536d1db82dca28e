//! User identities and public profiles.

pub mod manager;
pub mod types;

pub use manager::UserManager;
pub use types::{PublicProfile, User};

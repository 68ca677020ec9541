//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use burgershop_core::{UserId, Username};

/// A registered shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across the shop.
    pub username: Username,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored password hash.
///
/// Only the auth service sees this; nothing renders it.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    /// PHC-format argon2 hash.
    pub password_hash: String,
}

//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] burgershop_core::UsernameError),

    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown on the landing page after a failed login.
    #[must_use]
    pub const fn login_message(&self) -> &'static str {
        match self {
            Self::UserNotFound | Self::InvalidUsername(_) => "User not found",
            Self::InvalidCredentials => "Invalid password",
            _ => "Login failed",
        }
    }

    /// Message shown on the landing page after a failed registration.
    #[must_use]
    pub fn registration_message(&self) -> String {
        match self {
            Self::UserAlreadyExists => "Username already exists".to_owned(),
            Self::InvalidUsername(e) => capitalize(&e.to_string()),
            Self::WeakPassword(reason) => capitalize(reason),
            _ => "Failed to create user".to_owned(),
        }
    }

    /// Whether this is a server-side failure rather than bad input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_messages() {
        assert_eq!(AuthError::UserNotFound.login_message(), "User not found");
        assert_eq!(AuthError::InvalidCredentials.login_message(), "Invalid password");
        assert_eq!(AuthError::PasswordHash.login_message(), "Login failed");
    }

    #[test]
    fn test_registration_messages() {
        assert_eq!(
            AuthError::UserAlreadyExists.registration_message(),
            "Username already exists"
        );
        assert_eq!(
            AuthError::WeakPassword("password must be at least 8 characters".to_owned())
                .registration_message(),
            "Password must be at least 8 characters"
        );
        assert_eq!(
            AuthError::Repository(RepositoryError::NotFound).registration_message(),
            "Failed to create user"
        );
    }
}

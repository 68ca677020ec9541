//! Account username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    /// Shorter than [`Username::MIN_LENGTH`].
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// Longer than [`Username::MAX_LENGTH`].
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Contains something other than ASCII letters, digits, `_`, `-` or `.`.
    #[error("username may only contain letters, digits, '_', '-' and '.'")]
    InvalidCharacter,
}

/// A login name.
///
/// ## Constraints
///
/// - 3-32 characters after trimming surrounding whitespace
/// - ASCII letters, digits, `_`, `-` and `.` only
///
/// Comparison is exact (case-sensitive), matching how the credential store
/// enforces uniqueness.
///
/// ```
/// use burgershop_core::Username;
///
/// assert!(Username::parse("burger_fan").is_ok());
/// assert!(Username::parse("ab").is_err());
/// assert!(Username::parse("no spaces").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a username from form input.
    ///
    /// # Errors
    ///
    /// Returns a [`UsernameError`] if the trimmed input violates a constraint.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        let s = s.trim();

        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// The username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the username and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Username {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Username {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Username {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Username {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("bob").is_ok());
        assert!(Username::parse("Bob.Smith-2").is_ok());
        assert!(Username::parse(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn test_parse_trims() {
        assert_eq!(Username::parse("  alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_parse_length_bounds() {
        assert!(matches!(
            Username::parse("al"),
            Err(UsernameError::TooShort { min: 3 })
        ));
        assert!(matches!(
            Username::parse(&"x".repeat(33)),
            Err(UsernameError::TooLong { max: 32 })
        ));
    }

    #[test]
    fn test_parse_rejects_symbols() {
        assert_eq!(
            Username::parse("bob@home"),
            Err(UsernameError::InvalidCharacter)
        );
        assert_eq!(
            Username::parse("bob smith"),
            Err(UsernameError::InvalidCharacter)
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_ne!(Username::parse("Bob").unwrap(), Username::parse("bob").unwrap());
    }
}

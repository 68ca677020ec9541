//! Delivery contact details: email address and phone number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing contact details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// The phone number is not exactly ten digits.
    #[error("Phone number must be 10 digits")]
    InvalidPhone,
    /// The email address is empty.
    #[error("email cannot be empty")]
    EmptyEmail,
    /// The email address is longer than [`Email::MAX_LENGTH`].
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The email address is not of the form `local@domain`.
    #[error("email must look like name@example.com")]
    MalformedEmail,
}

/// A ten-digit phone number.
///
/// Spaces and dashes are accepted as separators and dropped; anything else
/// must be a digit.
///
/// ```
/// use burgershop_core::PhoneNumber;
///
/// assert_eq!(PhoneNumber::parse("555-123-4567").unwrap().as_str(), "5551234567");
/// assert!(PhoneNumber::parse("12345").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Required number of digits.
    pub const DIGITS: usize = 10;

    /// Parse a phone number from form input.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::InvalidPhone`] unless the input is exactly ten
    /// digits once separators are removed.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        digits_only(s, Self::DIGITS)
            .map(Self)
            .ok_or(ContactError::InvalidPhone)
    }

    /// The digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An email address with a non-empty local part and domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an email address from form input.
    ///
    /// # Errors
    ///
    /// Returns a [`ContactError`] if the trimmed input is empty, too long, or
    /// lacks a local part or domain around a single `@`.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::EmptyEmail);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ContactError::EmailTooLong {
                max: Self::MAX_LENGTH,
            });
        }
        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(ContactError::MalformedEmail),
        }
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip spaces and dashes, then require exactly `len` ASCII digits.
pub(crate) fn digits_only(s: &str, len: usize) -> Option<String> {
    let digits: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    (digits.len() == len && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

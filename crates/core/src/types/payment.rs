//! Payment card fields.
//!
//! Only the shape of the input is checked (digit counts). There is no Luhn
//! check and no payment processor behind the shop.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::contact::digits_only;

/// Errors that can occur when parsing payment fields.
///
/// The messages are shown to the shopper verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The card number is not exactly sixteen digits.
    #[error("Card number must be 16 digits")]
    InvalidCardNumber,
    /// The CVV is not exactly three digits.
    #[error("CVV must be 3 digits")]
    InvalidCvv,
    /// The payment method is not one we know.
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
}

/// A sixteen-digit card number.
///
/// ```
/// use burgershop_core::CardNumber;
///
/// assert!(CardNumber::parse("1234567890123456").is_ok());
/// assert!(CardNumber::parse("12345").is_err());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct CardNumber(String);

impl CardNumber {
    /// Required number of digits.
    pub const DIGITS: usize = 16;

    /// Parse a card number; spaces and dashes between groups are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidCardNumber`] unless exactly sixteen
    /// digits remain.
    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        digits_only(s, Self::DIGITS)
            .map(Self)
            .ok_or(PaymentError::InvalidCardNumber)
    }

    /// The full digits, for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last four digits.
    #[must_use]
    pub fn last4(&self) -> &str {
        self.0.get(Self::DIGITS - 4..).unwrap_or_default()
    }

    /// A display form that only reveals the last four digits.
    #[must_use]
    pub fn masked(&self) -> String {
        format!("•••• •••• •••• {}", self.last4())
    }
}

impl TryFrom<String> for CardNumber {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CardNumber> for String {
    fn from(card: CardNumber) -> Self {
        card.0
    }
}

impl fmt::Debug for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CardNumber").field(&self.masked()).finish()
    }
}

/// A three-digit card verification value.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct Cvv(String);

impl Cvv {
    /// Required number of digits.
    pub const DIGITS: usize = 3;

    /// Parse a CVV.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidCvv`] unless the trimmed input is
    /// exactly three digits.
    pub fn parse(s: &str) -> Result<Self, PaymentError> {
        let s = s.trim();
        if s.len() == Self::DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_owned()))
        } else {
            Err(PaymentError::InvalidCvv)
        }
    }

    /// The digits, for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cvv {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cvv> for String {
    fn from(cvv: Cvv) -> Self {
        cvv.0
    }
}

impl fmt::Debug for Cvv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cvv(***)")
    }
}

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    DebitCard,
}

impl PaymentMethod {
    /// All methods, in the order the payment form lists them.
    pub const ALL: [Self; 2] = [Self::CreditCard, Self::DebitCard];

    /// Stable identifier used in forms and the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit card",
            Self::DebitCard => "Debit card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "credit_card" | "credit" => Ok(Self::CreditCard),
            "debit_card" | "debit" => Ok(Self::DebitCard),
            other => Err(PaymentError::UnknownMethod(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_digit_count() {
        assert!(CardNumber::parse("1234567890123456").is_ok());
        assert_eq!(
            CardNumber::parse("12345"),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            CardNumber::parse("12345678901234567"),
            Err(PaymentError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_card_number_groups() {
        let card = CardNumber::parse("1234 5678-9012 3456").unwrap();
        assert_eq!(card.as_str(), "1234567890123456");
        assert_eq!(card.last4(), "3456");
    }

    #[test]
    fn test_card_number_debug_is_masked() {
        let card = CardNumber::parse("1234567890123456").unwrap();
        let debug = format!("{card:?}");
        assert!(debug.contains("3456"));
        assert!(!debug.contains("12345678"));
    }

    #[test]
    fn test_cvv_digit_count() {
        assert!(Cvv::parse("123").is_ok());
        assert_eq!(Cvv::parse("12"), Err(PaymentError::InvalidCvv));
        assert_eq!(Cvv::parse("1234"), Err(PaymentError::InvalidCvv));
        assert_eq!(Cvv::parse("12a"), Err(PaymentError::InvalidCvv));
    }

    #[test]
    fn test_cvv_debug_hides_digits() {
        assert_eq!(format!("{:?}", Cvv::parse("987").unwrap()), "Cvv(***)");
    }

    #[test]
    fn test_deserialize_checks_digit_counts() {
        let card: CardNumber = serde_json::from_str("\"1234 5678 9012 3456\"").unwrap();
        assert_eq!(card.as_str(), "1234567890123456");
        assert_eq!(serde_json::to_string(&card).unwrap(), "\"1234567890123456\"");
        assert!(serde_json::from_str::<CardNumber>("\"12345\"").is_err());

        assert!(serde_json::from_str::<Cvv>("\"123\"").is_ok());
        assert!(serde_json::from_str::<Cvv>("\"12\"").is_err());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(
            "debit_card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
        assert_eq!(
            "".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}

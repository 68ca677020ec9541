//! Checkout transactions and the payment form that produces them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use burgershop_core::{
    CardNumber, ContactError, CustomizedBurgerId, Cvv, Email, PaymentError, PaymentMethod,
    PhoneNumber, TransactionId, Username,
};

/// Errors from validating a payment form.
///
/// Displayed verbatim as the plain-text 400 body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DetailsError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Contact(#[from] ContactError),
    /// Expiry is not a valid `MM/YY`.
    #[error("Expiry date must be MM/YY")]
    InvalidExpiry,
    /// A required free-text field was blank.
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Card expiry as `MM/YY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardExpiry(String);

impl CardExpiry {
    /// Parse `MM/YY` (a four-digit year is shortened).
    ///
    /// # Errors
    ///
    /// Returns [`DetailsError::InvalidExpiry`] for anything else.
    pub fn parse(s: &str) -> Result<Self, DetailsError> {
        let (month, year) = s
            .trim()
            .split_once('/')
            .ok_or(DetailsError::InvalidExpiry)?;
        let month = month.trim();
        let year = year.trim();
        let year = match year.len() {
            2 => year,
            4 => year.get(2..).ok_or(DetailsError::InvalidExpiry)?,
            _ => return Err(DetailsError::InvalidExpiry),
        };
        if !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DetailsError::InvalidExpiry);
        }
        match month.parse::<u8>() {
            Ok(m @ 1..=12) if month.len() <= 2 => Ok(Self(format!("{m:02}/{year}"))),
            _ => Err(DetailsError::InvalidExpiry),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Card fields of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub card_number: CardNumber,
    pub expiry: CardExpiry,
    pub cvv: Cvv,
    pub method: PaymentMethod,
}

/// How to reach the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone: PhoneNumber,
    pub email: Email,
}

/// Where the burger goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryAddress {
    pub house_number: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Everything the shopper typed into the payment form, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub payment: PaymentDetails,
    pub contact: ContactDetails,
    pub address: DeliveryAddress,
}

/// Raw payment form submission, used by checkout and by transaction edits.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub payment_method: String,
    pub phone: String,
    pub email: String,
    pub house_number: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

impl PaymentForm {
    /// Validate the form into [`TransactionDetails`].
    ///
    /// Card number, CVV and phone are checked first, in that order, so the
    /// shopper always sees the first fixed-format problem. The remaining
    /// fields follow.
    ///
    /// # Errors
    ///
    /// Returns the first [`DetailsError`] encountered.
    pub fn validate(&self) -> Result<TransactionDetails, DetailsError> {
        let card_number = CardNumber::parse(&self.card_number)?;
        let cvv = Cvv::parse(&self.cvv)?;
        let phone = PhoneNumber::parse(&self.phone)?;

        let expiry = CardExpiry::parse(&self.expiry_date)?;
        let method: PaymentMethod = self.payment_method.parse()?;
        let email = Email::parse(&self.email)?;

        Ok(TransactionDetails {
            payment: PaymentDetails {
                card_number,
                expiry,
                cvv,
                method,
            },
            contact: ContactDetails { phone, email },
            address: DeliveryAddress {
                house_number: required(&self.house_number, "House number")?,
                street: required(&self.street, "Street")?,
                city: required(&self.city, "City")?,
                postal_code: required(&self.postal_code, "Postal code")?,
            },
        })
    }

    /// Prefill the form from stored details (card digits stay masked out).
    #[must_use]
    pub fn prefill(details: &TransactionDetails) -> Self {
        Self {
            card_number: String::new(),
            expiry_date: details.payment.expiry.as_str().to_owned(),
            cvv: String::new(),
            payment_method: details.payment.method.as_str().to_owned(),
            phone: details.contact.phone.as_str().to_owned(),
            email: details.contact.email.as_str().to_owned(),
            house_number: details.address.house_number.clone(),
            street: details.address.street.clone(),
            city: details.address.city.clone(),
            postal_code: details.address.postal_code.clone(),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DetailsError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DetailsError::Missing(field))
    } else {
        Ok(value.to_owned())
    }
}

/// A completed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    /// Owner; only this user may edit the record.
    pub username: Username,
    pub customized_burger_id: Option<CustomizedBurgerId>,
    pub details: TransactionDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Whether `username` may edit this transaction.
    #[must_use]
    pub fn is_owned_by(&self, username: &Username) -> bool {
        self.username == *username
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> PaymentForm {
        PaymentForm {
            card_number: "1234 5678 9012 3456".to_owned(),
            expiry_date: "09/28".to_owned(),
            cvv: "123".to_owned(),
            payment_method: "debit_card".to_owned(),
            phone: "555-123-4567".to_owned(),
            email: "shopper@example.com".to_owned(),
            house_number: "12".to_owned(),
            street: "Main St".to_owned(),
            city: "Springfield".to_owned(),
            postal_code: "12345".to_owned(),
        }
    }

    #[test]
    fn test_valid_form() {
        let details = valid_form().validate().unwrap();
        assert_eq!(details.payment.card_number.as_str(), "1234567890123456");
        assert_eq!(details.payment.method, PaymentMethod::DebitCard);
        assert_eq!(details.contact.phone.as_str(), "5551234567");
        assert_eq!(details.address.city, "Springfield");
    }

    #[test]
    fn test_fixed_format_checks_run_in_order() {
        let mut form = valid_form();
        form.card_number = "12345".to_owned();
        form.cvv = "12".to_owned();
        form.phone = "12345".to_owned();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Card number must be 16 digits"
        );

        form.card_number = "1234567890123456".to_owned();
        assert_eq!(form.validate().unwrap_err().to_string(), "CVV must be 3 digits");

        form.cvv = "123".to_owned();
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "Phone number must be 10 digits"
        );

        form.phone = "1234567890".to_owned();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_fixed_format_checks_precede_blank_fields() {
        let form = PaymentForm {
            card_number: "12345".to_owned(),
            ..PaymentForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            DetailsError::Payment(PaymentError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_missing_address_field() {
        let mut form = valid_form();
        form.street = "   ".to_owned();
        assert_eq!(form.validate().unwrap_err().to_string(), "Street is required");
    }

    #[test]
    fn test_card_expiry() {
        assert_eq!(CardExpiry::parse("9/28").unwrap().as_str(), "09/28");
        assert_eq!(CardExpiry::parse("12/2030").unwrap().as_str(), "12/30");
        assert!(CardExpiry::parse("13/28").is_err());
        assert!(CardExpiry::parse("0928").is_err());
        assert!(CardExpiry::parse("09/2x").is_err());
    }

    #[test]
    fn test_prefill_never_echoes_card_secrets() {
        let details = valid_form().validate().unwrap();
        let form = PaymentForm::prefill(&details);
        assert!(form.card_number.is_empty());
        assert!(form.cvv.is_empty());
        assert_eq!(form.phone, "5551234567");
    }
}

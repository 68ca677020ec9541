//! Transaction repository.
//!
//! Ownership is not enforced here; see `services::transactions` for the
//! username check that guards edits.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use burgershop_core::{
    CardNumber, CustomizedBurgerId, Cvv, Email, PaymentMethod, PhoneNumber, TransactionId,
    Username,
};

use super::RepositoryError;
use crate::models::transaction::{
    CardExpiry, ContactDetails, DeliveryAddress, PaymentDetails, Transaction, TransactionDetails,
};

const COLUMNS: &str = "id, username, customized_burger_id, card_number, card_expiry, cvv, \
    payment_method, phone, email, house_number, street, city, postal_code, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    username: String,
    customized_burger_id: Option<i32>,
    card_number: String,
    card_expiry: String,
    cvv: String,
    payment_method: String,
    phone: String,
    email: String,
    house_number: String,
    street: String,
    city: String,
    postal_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt(field: &str, id: i32, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {field} in transaction {id}: {e}"))
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let payment = PaymentDetails {
            card_number: CardNumber::parse(&row.card_number)
                .map_err(|e| corrupt("card number", id, e))?,
            expiry: CardExpiry::parse(&row.card_expiry).map_err(|e| corrupt("expiry", id, e))?,
            cvv: Cvv::parse(&row.cvv).map_err(|e| corrupt("cvv", id, e))?,
            method: row
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment method", id, e))?,
        };
        let contact = ContactDetails {
            phone: PhoneNumber::parse(&row.phone).map_err(|e| corrupt("phone", id, e))?,
            email: Email::parse(&row.email).map_err(|e| corrupt("email", id, e))?,
        };

        Ok(Self {
            id: TransactionId::new(id),
            username: Username::parse(&row.username).map_err(|e| corrupt("username", id, e))?,
            customized_burger_id: row.customized_burger_id.map(CustomizedBurgerId::new),
            details: TransactionDetails {
                payment,
                contact,
                address: DeliveryAddress {
                    house_number: row.house_number,
                    street: row.street,
                    city: row.city,
                    postal_code: row.postal_code,
                },
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for completed checkouts.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a checkout for `username`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        username: &Username,
        customized_burger_id: Option<CustomizedBurgerId>,
        details: &TransactionDetails,
    ) -> Result<Transaction, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO burgershop.transaction (
                username, customized_burger_id, card_number, card_expiry, cvv,
                payment_method, phone, email, house_number, street, city, postal_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(username.as_str())
            .bind(customized_burger_id.map(i32::from))
            .bind(details.payment.card_number.as_str())
            .bind(details.payment.expiry.as_str())
            .bind(details.payment.cvv.as_str())
            .bind(details.payment.method.as_str())
            .bind(details.contact.phone.as_str())
            .bind(details.contact.email.as_str())
            .bind(&details.address.house_number)
            .bind(&details.address.street)
            .bind(&details.address.city)
            .bind(&details.address.postal_code)
            .fetch_one(self.pool)
            .await?;

        row.try_into()
    }

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM burgershop.transaction WHERE id = $1");
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    /// List a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        username: &Username,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM burgershop.transaction \
             WHERE username = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(username.as_str())
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Replace the editable details of a transaction.
    ///
    /// Last write wins; the caller has already checked ownership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: TransactionId,
        details: &TransactionDetails,
    ) -> Result<Transaction, RepositoryError> {
        let sql = format!(
            r"
            UPDATE burgershop.transaction
            SET card_number = $2, card_expiry = $3, cvv = $4, payment_method = $5,
                phone = $6, email = $7, house_number = $8, street = $9,
                city = $10, postal_code = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(id.as_i32())
            .bind(details.payment.card_number.as_str())
            .bind(details.payment.expiry.as_str())
            .bind(details.payment.cvv.as_str())
            .bind(details.payment.method.as_str())
            .bind(details.contact.phone.as_str())
            .bind(details.contact.email.as_str())
            .bind(&details.address.house_number)
            .bind(&details.address.street)
            .bind(&details.address.city)
            .bind(&details.address.postal_code)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }
}

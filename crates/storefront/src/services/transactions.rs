//! Transaction access with ownership checks.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use burgershop_core::{TransactionId, Username};

use crate::db::{RepositoryError, TransactionRepository};
use crate::models::transaction::{DetailsError, PaymentForm, Transaction};

/// Errors from transaction access.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Transaction not found")]
    NotFound,

    /// The transaction belongs to another user.
    #[error("You can only edit your own transactions")]
    Forbidden,

    /// The submitted details did not validate.
    #[error(transparent)]
    Invalid(#[from] DetailsError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Transaction service.
pub struct TransactionService<'a> {
    transactions: TransactionRepository<'a>,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            transactions: TransactionRepository::new(pool),
        }
    }

    /// List `username`'s transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::Repository` if the query fails.
    pub async fn list_for_user(
        &self,
        username: &Username,
    ) -> Result<Vec<Transaction>, TransactionError> {
        Ok(self.transactions.list_for_user(username).await?)
    }

    /// Get a transaction `requester` is allowed to edit.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if there is no such transaction.
    /// Returns `TransactionError::Forbidden` if it belongs to someone else.
    pub async fn find_owned(
        &self,
        id: TransactionId,
        requester: &Username,
    ) -> Result<Transaction, TransactionError> {
        let transaction = self
            .transactions
            .find_by_id(id)
            .await?
            .ok_or(TransactionError::NotFound)?;

        if !transaction.is_owned_by(requester) {
            warn!(transaction_id = %id, requester = %requester, "Foreign transaction access");
            return Err(TransactionError::Forbidden);
        }

        Ok(transaction)
    }

    /// Replace the details of a transaction `requester` owns.
    ///
    /// Ownership is checked before the form, so a foreign transaction is
    /// refused whatever was submitted, and is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotFound` if there is no such transaction.
    /// Returns `TransactionError::Forbidden` if it belongs to someone else.
    /// Returns `TransactionError::Invalid` if the form does not validate.
    #[instrument(skip(self, form), fields(transaction_id = %id, requester = %requester))]
    pub async fn update_owned(
        &self,
        id: TransactionId,
        requester: &Username,
        form: &PaymentForm,
    ) -> Result<Transaction, TransactionError> {
        self.find_owned(id, requester).await?;

        let details = form.validate().inspect_err(|e| {
            warn!(error = %e, "Rejected transaction edit");
        })?;

        let updated = self
            .transactions
            .update(id, &details)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TransactionError::NotFound,
                other => TransactionError::Repository(other),
            })?;

        info!("Transaction updated");
        Ok(updated)
    }
}

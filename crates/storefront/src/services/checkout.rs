//! Checkout flow: customization, pending orders, and payment.
//!
//! A customization becomes a [`PendingOrder`] row; the browser only holds its
//! id. Paying for it first claims (deletes) the pending order, then writes a
//! customized burger and a transaction. The steps are independent statements:
//! if a late step fails the earlier ones stay done.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use burgershop_core::{BurgerId, IngredientLine, PendingOrderId};

use super::catalog::Catalog;
use crate::db::{
    CustomizedBurgerRepository, PendingOrderRepository, RepositoryError, TransactionRepository,
};
use crate::models::burger::{Burger, CustomizedBurger};
use crate::models::pending_order::PendingOrder;
use crate::models::session::{CurrentUser, PENDING_ORDER_TTL};
use crate::models::transaction::{Transaction, TransactionDetails};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The burger does not exist (or no longer does).
    #[error("Burger not found")]
    BurgerNotFound,

    /// Nothing left after normalizing the submitted ingredients.
    #[error("Choose at least one ingredient")]
    EmptyCustomization,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A pending order with the catalog burger it customizes.
#[derive(Debug, Clone)]
pub struct OrderInProgress {
    pub order: PendingOrder,
    pub burger: Burger,
}

/// Rows written when an order is paid for.
#[derive(Debug, Clone)]
pub struct CompletedOrder {
    pub burger: Burger,
    pub customized: CustomizedBurger,
    pub transaction: Transaction,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    catalog: &'a Catalog,
    pending: PendingOrderRepository<'a>,
    customized: CustomizedBurgerRepository<'a>,
    transactions: TransactionRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            pending: PendingOrderRepository::new(pool),
            customized: CustomizedBurgerRepository::new(pool),
            transactions: TransactionRepository::new(pool),
        }
    }

    /// Load a catalog burger for customization.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::BurgerNotFound` if there is no such burger.
    pub async fn burger(&self, id: BurgerId) -> Result<Burger, CheckoutError> {
        self.catalog
            .find_by_id(id)
            .await?
            .ok_or(CheckoutError::BurgerNotFound)
    }

    /// Store a customization as a pending order for `user`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCustomization` if `lines` is empty.
    /// Returns `CheckoutError::BurgerNotFound` if the burger does not exist.
    #[instrument(skip(self, user, lines), fields(username = %user.username, burger_id = %burger_id))]
    pub async fn start(
        &self,
        user: &CurrentUser,
        burger_id: BurgerId,
        lines: &[IngredientLine],
    ) -> Result<OrderInProgress, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCustomization);
        }
        let burger = self.burger(burger_id).await?;

        let order = self
            .pending
            .create(&user.username, burger.id, lines, Utc::now() + PENDING_ORDER_TTL)
            .await?;

        info!(pending_order = %order.id, "Pending order created");
        Ok(OrderInProgress { order, burger })
    }

    /// Resolve the pending order named by the session token.
    ///
    /// Returns `None` when there is no token, or the order is expired, paid,
    /// or belongs to someone else. The burger is re-fetched every time.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::BurgerNotFound` if the burger has gone away.
    pub async fn resume(
        &self,
        user: &CurrentUser,
        id: Option<PendingOrderId>,
    ) -> Result<Option<OrderInProgress>, CheckoutError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let Some(order) = self.pending.find_active(id, &user.username).await? else {
            return Ok(None);
        };
        let burger = self.burger(order.burger_id).await?;

        Ok(Some(OrderInProgress { order, burger }))
    }

    /// Pay for the pending order named by the session token.
    ///
    /// The order is claimed before anything is written, so it is paid for at
    /// most once. Returns `None` when there is no token, or the order is
    /// expired, already paid, or belongs to someone else.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::BurgerNotFound` if the burger has gone away and
    /// `CheckoutError::Repository` if any write fails; steps completed before
    /// the failure are kept.
    #[instrument(skip_all, fields(username = %user.username))]
    pub async fn complete(
        &self,
        user: &CurrentUser,
        id: Option<PendingOrderId>,
        details: &TransactionDetails,
    ) -> Result<Option<CompletedOrder>, CheckoutError> {
        let Some(id) = id else {
            return Ok(None);
        };
        let Some(order) = self.pending.take(id, &user.username).await? else {
            info!(pending_order = %id, "Pending order missing or already claimed");
            return Ok(None);
        };
        let burger = self.burger(order.burger_id).await?;

        let customized = self
            .customized
            .create(user.id, order.burger_id, &order.ingredients)
            .await?;

        let transaction = self
            .transactions
            .create(&user.username, Some(customized.id), details)
            .await?;

        info!(
            pending_order = %order.id,
            transaction_id = %transaction.id,
            customized_burger_id = %customized.id,
            "Order completed"
        );
        Ok(Some(CompletedOrder {
            burger,
            customized,
            transaction,
        }))
    }

    /// Delete expired pending orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        self.pending.purge_expired().await
    }
}

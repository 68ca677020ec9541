//! Pending order repository.
//!
//! Rows live for [`PENDING_ORDER_TTL`](crate::models::session::PENDING_ORDER_TTL);
//! lookups ignore expired rows and a background task deletes them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use burgershop_core::{BurgerId, IngredientLine, PendingOrderId, Username};

use super::RepositoryError;
use crate::models::pending_order::PendingOrder;

#[derive(Debug, sqlx::FromRow)]
struct PendingOrderRow {
    id: Uuid,
    username: String,
    burger_id: i32,
    ingredients: Json<Vec<IngredientLine>>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<PendingOrderRow> for PendingOrder {
    type Error = RepositoryError;

    fn try_from(row: PendingOrderRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username on pending order: {e}"))
        })?;

        Ok(Self {
            id: PendingOrderId::from_uuid(row.id),
            username,
            burger_id: BurgerId::new(row.burger_id),
            ingredients: row.ingredients.0,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

/// Repository for orders awaiting payment.
pub struct PendingOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PendingOrderRepository<'a> {
    /// Create a new pending order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new pending order with a fresh random id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        username: &Username,
        burger_id: BurgerId,
        ingredients: &[IngredientLine],
        expires_at: DateTime<Utc>,
    ) -> Result<PendingOrder, RepositoryError> {
        let row = sqlx::query_as::<_, PendingOrderRow>(
            r"
            INSERT INTO burgershop.pending_order (id, username, burger_id, ingredients, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, burger_id, ingredients, created_at, expires_at
            ",
        )
        .bind(PendingOrderId::generate().as_uuid())
        .bind(username.as_str())
        .bind(burger_id.as_i32())
        .bind(Json(ingredients))
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Find an unexpired pending order owned by `username`.
    ///
    /// Orders belonging to anyone else are reported as absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(
        &self,
        id: PendingOrderId,
        username: &Username,
    ) -> Result<Option<PendingOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, PendingOrderRow>(
            r"
            SELECT id, username, burger_id, ingredients, created_at, expires_at
            FROM burgershop.pending_order
            WHERE id = $1 AND username = $2 AND expires_at > NOW()
            ",
        )
        .bind(id.as_uuid())
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(PendingOrder::try_from).transpose()
    }

    /// Claim an unexpired pending order owned by `username` for payment.
    ///
    /// The row is deleted and returned in one statement, so of several
    /// concurrent claims on the same order exactly one gets it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn take(
        &self,
        id: PendingOrderId,
        username: &Username,
    ) -> Result<Option<PendingOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, PendingOrderRow>(
            r"
            DELETE FROM burgershop.pending_order
            WHERE id = $1 AND username = $2 AND expires_at > NOW()
            RETURNING id, username, burger_id, ingredients, created_at, expires_at
            ",
        )
        .bind(id.as_uuid())
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(PendingOrder::try_from).transpose()
    }

    /// Delete every expired pending order.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM burgershop.pending_order WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

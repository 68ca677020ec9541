//! Customized burger repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use burgershop_core::{BurgerId, CustomizedBurgerId, IngredientLine, UserId};

use super::RepositoryError;
use crate::models::burger::CustomizedBurger;

#[derive(Debug, sqlx::FromRow)]
struct CustomizedBurgerRow {
    id: i32,
    user_id: i32,
    burger_id: i32,
    burger_name: String,
    ingredients: Json<Vec<IngredientLine>>,
    created_at: DateTime<Utc>,
}

impl From<CustomizedBurgerRow> for CustomizedBurger {
    fn from(row: CustomizedBurgerRow) -> Self {
        Self {
            id: CustomizedBurgerId::new(row.id),
            user_id: UserId::new(row.user_id),
            burger_id: BurgerId::new(row.burger_id),
            burger_name: row.burger_name,
            ingredients: row.ingredients.0,
            created_at: row.created_at,
        }
    }
}

/// Repository for per-user customized burgers.
pub struct CustomizedBurgerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomizedBurgerRepository<'a> {
    /// Create a new customized burger repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a customization for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown user or burger).
    pub async fn create(
        &self,
        user_id: UserId,
        burger_id: BurgerId,
        ingredients: &[IngredientLine],
    ) -> Result<CustomizedBurger, RepositoryError> {
        let row = sqlx::query_as::<_, CustomizedBurgerRow>(
            r"
            WITH inserted AS (
                INSERT INTO burgershop.customized_burger (user_id, burger_id, ingredients)
                VALUES ($1, $2, $3)
                RETURNING id, user_id, burger_id, ingredients, created_at
            )
            SELECT i.id, i.user_id, i.burger_id, b.name AS burger_name,
                   i.ingredients, i.created_at
            FROM inserted i
            JOIN burgershop.burger b ON b.id = i.burger_id
            ",
        )
        .bind(user_id.as_i32())
        .bind(burger_id.as_i32())
        .bind(Json(ingredients))
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List a user's customized burgers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomizedBurger>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomizedBurgerRow>(
            r"
            SELECT c.id, c.user_id, c.burger_id, b.name AS burger_name,
                   c.ingredients, c.created_at
            FROM burgershop.customized_burger c
            JOIN burgershop.burger b ON b.id = c.burger_id
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CustomizedBurger::from).collect())
    }
}

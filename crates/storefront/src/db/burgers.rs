//! Burger (catalog) repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use burgershop_core::{BurgerId, Price};

use super::RepositoryError;
use crate::models::burger::{Burger, NewBurger};

#[derive(Debug, sqlx::FromRow)]
struct BurgerRow {
    id: i32,
    name: String,
    price: Decimal,
    ingredients: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BurgerRow> for Burger {
    type Error = RepositoryError;

    fn try_from(row: BurgerRow) -> Result<Self, Self::Error> {
        let price = Price::from_decimal(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for burger {}: {e}", row.id))
        })?;

        Ok(Self {
            id: BurgerId::new(row.id),
            name: row.name,
            price,
            ingredients: row.ingredients,
            created_at: row.created_at,
        })
    }
}

/// Repository for the menu.
pub struct BurgerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BurgerRepository<'a> {
    /// Create a new burger repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a burger to the menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, burger: &NewBurger) -> Result<Burger, RepositoryError> {
        let row = sqlx::query_as::<_, BurgerRow>(
            r"
            INSERT INTO burgershop.burger (name, price, ingredients)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, ingredients, created_at
            ",
        )
        .bind(&burger.name)
        .bind(burger.price.amount())
        .bind(&burger.ingredients)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a burger by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: BurgerId) -> Result<Option<Burger>, RepositoryError> {
        let row = sqlx::query_as::<_, BurgerRow>(
            r"
            SELECT id, name, price, ingredients, created_at
            FROM burgershop.burger
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(Burger::try_from).transpose()
    }

    /// List the whole menu, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Burger>, RepositoryError> {
        let rows = sqlx::query_as::<_, BurgerRow>(
            r"
            SELECT id, name, price, ingredients, created_at
            FROM burgershop.burger
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Burger::try_from).collect()
    }
}

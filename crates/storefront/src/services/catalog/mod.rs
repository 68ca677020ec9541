//! Catalog service.
//!
//! Reads the menu through an in-memory `moka` cache (5-minute TTL). Burgers are
//! never updated or deleted, so a cached burger stays correct; creating a
//! burger only invalidates the listing.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use burgershop_core::BurgerId;

use crate::db::{BurgerRepository, RepositoryError};
use crate::models::burger::{Burger, NewBurger};

use cache::{CacheKey, CacheValue};

/// Cached access to the menu.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    pool: PgPool,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Create a catalog backed by `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogInner { pool, cache }),
        }
    }

    fn repository(&self) -> BurgerRepository<'_> {
        BurgerRepository::new(&self.inner.pool)
    }

    /// Get a burger by ID.
    ///
    /// Absent burgers are not cached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup misses the cache and the query fails.
    #[instrument(skip(self), fields(burger_id = %id))]
    pub async fn find_by_id(&self, id: BurgerId) -> Result<Option<Burger>, RepositoryError> {
        let key = CacheKey::Burger(id);

        if let Some(CacheValue::Burger(burger)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for burger");
            return Ok(Some(*burger));
        }

        let burger = self.repository().find_by_id(id).await?;

        if let Some(burger) = &burger {
            self.remember(burger).await;
        }

        Ok(burger)
    }

    /// List the whole menu, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the listing misses the cache and the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Burger>, RepositoryError> {
        if let Some(CacheValue::All(burgers)) = self.inner.cache.get(&CacheKey::All).await {
            debug!("Cache hit for menu");
            return Ok(burgers);
        }

        let burgers = self.repository().list_all().await?;

        self.inner
            .cache
            .insert(CacheKey::All, CacheValue::All(burgers.clone()))
            .await;

        Ok(burgers)
    }

    /// Add a burger to the menu.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the insert fails.
    #[instrument(skip(self, burger), fields(name = %burger.name))]
    pub async fn create(&self, burger: &NewBurger) -> Result<Burger, RepositoryError> {
        let created = self.repository().create(burger).await?;

        self.inner.cache.invalidate(&CacheKey::All).await;
        self.remember(&created).await;

        Ok(created)
    }

    async fn remember(&self, burger: &Burger) {
        self.inner
            .cache
            .insert(
                CacheKey::Burger(burger.id),
                CacheValue::Burger(Box::new(burger.clone())),
            )
            .await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use sqlx::postgres::PgPoolOptions;

    use burgershop_core::Price;

    use super::*;

    fn catalog() -> Catalog {
        // Never connects: every read below must be served from the cache.
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(50))
            .connect_lazy("postgres://invalid@127.0.0.1:1/none")
            .unwrap();
        Catalog::new(pool)
    }

    fn burger(id: i32) -> Burger {
        Burger {
            id: BurgerId::new(id),
            name: "Classic".to_owned(),
            price: Price::parse("8.50").unwrap(),
            ingredients: vec!["bun".to_owned(), "patty".to_owned()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_repeated_reads_return_identical_data() {
        let catalog = catalog();
        let stored = burger(7);
        catalog.remember(&stored).await;

        let first = catalog.find_by_id(BurgerId::new(7)).await.unwrap();
        let second = catalog.find_by_id(BurgerId::new(7)).await.unwrap();
        assert_eq!(first, Some(stored));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_evicted_burger_is_read_from_the_database() {
        let catalog = catalog();
        catalog.remember(&burger(7)).await;
        catalog.inner.cache.invalidate_all();
        catalog.inner.cache.run_pending_tasks().await;

        assert!(catalog.find_by_id(BurgerId::new(7)).await.is_err());
    }
}

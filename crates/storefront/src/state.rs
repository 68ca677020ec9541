//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::middleware::session::{TokenError, TokenSigner};
use crate::services::{Catalog, CheckoutService};

/// How often expired pending orders are deleted.
const PENDING_ORDER_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration. None of it
/// is mutable business state; who the caller is always comes from the
/// request's own session token.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    tokens: TokenSigner,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the session secret cannot key the token signer.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, TokenError> {
        let tokens = TokenSigner::new(&config.session_secret)?;
        let catalog = Catalog::new(pool.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                catalog,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the session token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Spawn the background task that purges expired pending orders.
    pub fn start_pending_order_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PENDING_ORDER_SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let checkout = CheckoutService::new(state.pool(), state.catalog());
                match checkout.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!(purged, "Purged expired pending orders"),
                    Err(e) => tracing::warn!(error = %e, "Failed to purge pending orders"),
                }
            }
        })
    }
}

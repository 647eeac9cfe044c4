//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::catalog::CatalogCache;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let catalog = CatalogCache::new(config.catalog_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
            }),
        }
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

    /// Get a reference to the product detail cache.
    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.inner.catalog
    }
}

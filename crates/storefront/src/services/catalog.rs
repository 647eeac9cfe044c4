//! In-process cache for product detail pages.
//!
//! Product details are read far more often than they change, so the storefront
//! keeps them in a `moka` cache for a short TTL. Back-office edits become
//! visible once the entry expires.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use brandbazaar_core::dto::ProductDetail;

use crate::db::{ProductRepository, RepositoryError};

/// Cached product details keyed by slug.
#[derive(Clone)]
pub struct CatalogCache {
    details: Cache<String, Arc<ProductDetail>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let details = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { details }
    }

    /// Listed product detail by slug, from cache or the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    #[instrument(skip(self, pool))]
    pub async fn product(
        &self,
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Arc<ProductDetail>>, RepositoryError> {
        if let Some(detail) = self.details.get(slug).await {
            debug!("Cache hit for product");
            return Ok(Some(detail));
        }

        let Some(detail) = ProductRepository::new(pool).get_public_detail(slug).await? else {
            return Ok(None);
        };
        let detail = Arc::new(detail);
        self.details.insert(slug.to_owned(), Arc::clone(&detail)).await;
        Ok(Some(detail))
    }

    /// Drop a cached product, e.g. after a review changes its rating.
    pub async fn invalidate(&self, slug: &str) {
        self.details.invalidate(slug).await;
    }
}

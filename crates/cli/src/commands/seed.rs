//! Seed the catalog from a YAML file.
//!
//! The file lists products in the same shape the admin API accepts for
//! `POST /api/admin/products`. Seeding is idempotent: a product whose slug
//! already exists is not recreated, and a variant whose SKU already exists is
//! skipped. New variants listed under an existing product are added to it.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use brandbazaar_admin::db::CatalogAdminRepository;
use brandbazaar_core::dto::CreateProduct;
use brandbazaar_core::{Validate, ValidationErrors};
use brandbazaar_storefront::db::RepositoryError;

use super::{ConnectError, connect};

/// Top-level layout of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<CreateProduct>,
}

/// What a seed run changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub products_created: usize,
    pub variants_created: usize,
    /// Products and variants that already existed.
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Cannot read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Product {slug}: {errors}")]
    Invalid {
        slug: String,
        errors: ValidationErrors,
    },

    #[error("Seed file lists slug {0} more than once")]
    DuplicateSlug(String),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Parse and validate a seed file without touching the database.
///
/// # Errors
///
/// Returns `SeedError::Invalid` naming the first product that fails
/// validation.
pub fn parse(content: &str) -> Result<SeedFile, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;

    let mut slugs = std::collections::HashSet::new();
    for product in &file.products {
        let slug = product.resolved_slug();
        if let Err(errors) = product.validate() {
            return Err(SeedError::Invalid { slug, errors });
        }
        if !slugs.insert(slug.clone()) {
            return Err(SeedError::DuplicateSlug(slug));
        }
    }
    Ok(file)
}

/// Seed from the YAML file at `path`.
pub async fn from_file(path: &Path) -> Result<SeedReport, SeedError> {
    info!(path = %path.display(), "Loading seed file");

    // Read and validate before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let file = parse(&content)?;
    info!(products = file.products.len(), "Parsed seed file");

    let pool = connect().await?;
    let catalog = CatalogAdminRepository::new(&pool);
    let mut report = SeedReport::default();

    for mut product in file.products {
        let slug = product.resolved_slug();

        let mut variants = Vec::with_capacity(product.variants.len());
        for variant in std::mem::take(&mut product.variants) {
            if catalog.sku_exists(variant.sku.trim()).await? {
                report.skipped += 1;
            } else {
                variants.push(variant);
            }
        }

        match catalog.id_by_slug(&slug).await? {
            Some(id) => {
                report.skipped += 1;
                for variant in &variants {
                    catalog.create_variant(id, variant).await?;
                    report.variants_created += 1;
                }
                if !variants.is_empty() {
                    warn!(%slug, added = variants.len(), "Added variants to existing product");
                }
            }
            None => {
                report.variants_created += variants.len();
                product.variants = variants;
                catalog.create(&product).await?;
                report.products_created += 1;
                info!(%slug, "Created product");
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DEMO: &str = include_str!("../../seed/demo.yaml");

    #[test]
    fn test_demo_seed_is_valid() {
        let file = parse(DEMO).unwrap();
        assert!(!file.products.is_empty());
        assert!(file.products.iter().all(|p| !p.variants.is_empty()));
    }

    #[test]
    fn test_slug_is_derived_from_name() {
        let file = parse(
            r#"
products:
  - name: Canvas Tote
    brand: Northwind
    category: Bags
    basePrice: "24.00"
"#,
        )
        .unwrap();
        assert_eq!(file.products[0].resolved_slug(), "canvas-tote");
        assert!(file.products[0].is_public);
    }

    #[test]
    fn test_invalid_product_names_its_slug() {
        let err = parse(
            r#"
products:
  - name: Broken
    brand: ""
    category: Bags
    basePrice: "10.00"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::Invalid { ref slug, .. } if slug == "broken"));
    }

    #[test]
    fn test_duplicate_slug_is_rejected() {
        let err = parse(
            r#"
products:
  - name: Cap
    brand: A
    category: Hats
    basePrice: "10.00"
  - name: Other Cap
    slug: cap
    brand: B
    category: Hats
    basePrice: "12.00"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, SeedError::DuplicateSlug(ref s) if s == "cap"));
    }
}

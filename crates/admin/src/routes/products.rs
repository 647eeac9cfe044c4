//! Catalog management: products, visibility, soft delete, and variants.
//!
//! Storefront product pages are cached for `CATALOG_CACHE_TTL_SECS`, so
//! edits show up there once the cached entry expires.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use brandbazaar_core::dto::{
    AdminProductFilter, AdminProductView, CreateProduct, CreateVariant, SetVisibility,
    UpdateProduct, UpdateVariant, VariantView,
};
use brandbazaar_core::{Paginated, ProductId, Validate, VariantId};
use brandbazaar_storefront::extract::{ApiJson, ApiPath, ApiQuery};

use crate::db::CatalogAdminRepository;
use crate::error::{AppError, Result, not_found};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

async fn load(state: &AppState, id: ProductId) -> Result<AdminProductView> {
    CatalogAdminRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// `GET /api/admin/products`
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(filter): ApiQuery<AdminProductFilter>,
) -> Result<Json<Paginated<AdminProductView>>> {
    Ok(Json(CatalogAdminRepository::new(state.pool()).list(&filter).await?))
}

/// `GET /api/admin/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<AdminProductView>> {
    Ok(Json(load(&state, id).await?))
}

/// `POST /api/admin/products`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<CreateProduct>,
) -> Result<(StatusCode, Json<AdminProductView>)> {
    input.validate()?;
    let id = CatalogAdminRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(load(&state, id).await?)))
}

/// `PATCH /api/admin/products/{id}`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<UpdateProduct>,
) -> Result<Json<AdminProductView>> {
    input.validate()?;
    CatalogAdminRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(load(&state, id).await?))
}

/// `POST /api/admin/products/{id}/visibility`
pub async fn set_visibility(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<SetVisibility>,
) -> Result<Json<AdminProductView>> {
    CatalogAdminRepository::new(state.pool())
        .set_visibility(id, input.is_public)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(load(&state, id).await?))
}

/// `DELETE /api/admin/products/{id}` (soft delete)
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    CatalogAdminRepository::new(state.pool())
        .soft_delete(id)
        .await
        .map_err(not_found("Product"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/products/{id}/restore`
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<AdminProductView>> {
    CatalogAdminRepository::new(state.pool())
        .restore(id)
        .await
        .map_err(not_found("Product"))?;
    Ok(Json(load(&state, id).await?))
}

/// `POST /api/admin/products/{id}/variants`
pub async fn create_variant(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(input): ApiJson<CreateVariant>,
) -> Result<(StatusCode, Json<VariantView>)> {
    input.validate()?;
    let product = load(&state, id).await?;
    let variant = CatalogAdminRepository::new(state.pool())
        .create_variant(id, &input)
        .await
        .map_err(not_found("Product"))?;
    let view = variant.view(product.detail.summary.base_price);
    Ok((StatusCode::CREATED, Json(view)))
}

/// `PATCH /api/admin/products/{id}/variants/{variantId}`
pub async fn update_variant(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath((id, variant_id)): ApiPath<(ProductId, VariantId)>,
    ApiJson(input): ApiJson<UpdateVariant>,
) -> Result<Json<VariantView>> {
    input.validate()?;
    let product = load(&state, id).await?;
    let variant = CatalogAdminRepository::new(state.pool())
        .update_variant(id, variant_id, &input)
        .await
        .map_err(not_found("Variant"))?;
    Ok(Json(variant.view(product.detail.summary.base_price)))
}

/// `DELETE /api/admin/products/{id}/variants/{variantId}`
///
/// Variants that appear on orders can't be deleted; set their stock to zero.
pub async fn delete_variant(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath((id, variant_id)): ApiPath<(ProductId, VariantId)>,
) -> Result<StatusCode> {
    CatalogAdminRepository::new(state.pool())
        .delete_variant(id, variant_id)
        .await
        .map_err(not_found("Variant"))?;
    Ok(StatusCode::NO_CONTENT)
}

//! Catalog browsing, reviews, and the recently-viewed list.

use axum::{Json, extract::State, http::StatusCode};
use tower_sessions::Session;
use tracing::instrument;

use brandbazaar_core::dto::{
    CreateReview, ProductDetail, ProductFilter, ProductSummary, ReviewView,
};
use brandbazaar_core::{PageRequest, Paginated, ProductId, Validate};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::state::AppState;

/// Most products kept in the recently-viewed list.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Move `id` to the front of `list`, keeping entries distinct and bounded.
pub fn record_view(list: &mut Vec<ProductId>, id: ProductId) {
    list.retain(|existing| *existing != id);
    list.insert(0, id);
    list.truncate(RECENTLY_VIEWED_LIMIT);
}

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Paginated<ProductSummary>>> {
    filter.validate()?;
    let page = ProductRepository::new(state.pool())
        .list_public(&filter)
        .await?;
    Ok(Json(page))
}

/// `GET /api/products/{slug}`
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ProductDetail>> {
    let detail = state
        .catalog()
        .product(state.pool(), &slug)
        .await?
        .ok_or_else(product_not_found)?;

    let mut viewed: Vec<ProductId> = session
        .get(session_keys::RECENTLY_VIEWED)
        .await?
        .unwrap_or_default();
    record_view(&mut viewed, detail.summary.id);
    session.insert(session_keys::RECENTLY_VIEWED, &viewed).await?;

    Ok(Json(ProductDetail::clone(&detail)))
}

/// `GET /api/products/{slug}/reviews`
pub async fn reviews(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(page): ApiQuery<PageRequest>,
) -> Result<Json<Paginated<ReviewView>>> {
    let product_id = ProductRepository::new(state.pool())
        .public_id_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id, page)
        .await?;
    Ok(Json(reviews.map(|r| r.view())))
}

/// `POST /api/products/{slug}/reviews`
#[instrument(skip(state, input), fields(user_id = %user.id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(slug): ApiPath<String>,
    ApiJson(input): ApiJson<CreateReview>,
) -> Result<(StatusCode, Json<ReviewView>)> {
    input.validate()?;
    let product_id = ProductRepository::new(state.pool())
        .public_id_by_slug(&slug)
        .await?
        .ok_or_else(product_not_found)?;

    let review = ReviewRepository::new(state.pool())
        .create(product_id, user.id, &input)
        .await?;
    state.catalog().invalidate(&slug).await;

    Ok((StatusCode::CREATED, Json(review.view())))
}

/// `GET /api/recently-viewed`
pub async fn recently_viewed(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<ProductSummary>>> {
    let viewed: Vec<ProductId> = session
        .get(session_keys::RECENTLY_VIEWED)
        .await?
        .unwrap_or_default();
    let products = ProductRepository::new(state.pool())
        .summaries_by_ids(&viewed)
        .await?;
    Ok(Json(products))
}

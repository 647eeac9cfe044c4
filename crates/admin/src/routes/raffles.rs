//! Raffle management and winner selection.
//!
//! Lifecycle moves (`open`, `close`, `cancel`, `draw`, `advance`) run
//! through `RaffleService` and answer with the refreshed raffle.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use brandbazaar_core::dto::{
    AdminRaffleView, CreateRaffle, RaffleEntryView, RaffleFilter, UpdateRaffle,
};
use brandbazaar_core::{Paginated, RaffleId, RaffleStatus, Validate};
use brandbazaar_storefront::db::RaffleRepository;
use brandbazaar_storefront::extract::{ApiJson, ApiPath, ApiQuery};
use brandbazaar_storefront::services::raffle::RaffleService;

use crate::db::RaffleAdminRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// A raffle with its full entry list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRaffleDetail {
    #[serde(flatten)]
    pub raffle: AdminRaffleView,
    pub entries: Vec<RaffleEntryView>,
}

async fn load(state: &AppState, id: RaffleId) -> Result<AdminRaffleView> {
    RaffleRepository::new(state.pool())
        .get(id, None, true)
        .await?
        .map(|listing| listing.admin_view())
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))
}

/// `GET /api/admin/raffles`, drafts included.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(filter): ApiQuery<RaffleFilter>,
) -> Result<Json<Paginated<AdminRaffleView>>> {
    let page = RaffleRepository::new(state.pool())
        .list(&filter, None, true)
        .await?;
    Ok(Json(page.map(|listing| listing.admin_view())))
}

/// `GET /api/admin/raffles/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleDetail>> {
    let raffle = load(&state, id).await?;
    let entries = RaffleRepository::new(state.pool()).entries(id).await?;
    Ok(Json(AdminRaffleDetail { raffle, entries }))
}

/// `GET /api/admin/raffles/{id}/entries`
pub async fn entries(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<Vec<RaffleEntryView>>> {
    load(&state, id).await?;
    Ok(Json(RaffleRepository::new(state.pool()).entries(id).await?))
}

/// `POST /api/admin/raffles`. New raffles start as drafts.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<CreateRaffle>,
) -> Result<(StatusCode, Json<AdminRaffleView>)> {
    input.validate()?;
    let id = RaffleAdminRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(load(&state, id).await?)))
}

/// `PATCH /api/admin/raffles/{id}`. Draft and open raffles only.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
    ApiJson(input): ApiJson<UpdateRaffle>,
) -> Result<Json<AdminRaffleView>> {
    input.validate()?;
    RaffleAdminRepository::new(state.pool())
        .update(id, &input)
        .await?;
    Ok(Json(load(&state, id).await?))
}

async fn transition(
    state: &AppState,
    id: RaffleId,
    next: RaffleStatus,
) -> Result<Json<AdminRaffleView>> {
    RaffleService::new(state.pool())
        .transition(id, next, Utc::now())
        .await?;
    Ok(Json(load(state, id).await?))
}

/// `POST /api/admin/raffles/{id}/open`
pub async fn open(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleView>> {
    transition(&state, id, RaffleStatus::Open).await
}

/// `POST /api/admin/raffles/{id}/close`
pub async fn close(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleView>> {
    transition(&state, id, RaffleStatus::Closed).await
}

/// `POST /api/admin/raffles/{id}/cancel`
pub async fn cancel(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleView>> {
    transition(&state, id, RaffleStatus::Cancelled).await
}

/// `POST /api/admin/raffles/{id}/draw`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn draw(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleView>> {
    RaffleService::new(state.pool())
        .start_drawing(id, Utc::now())
        .await?;
    Ok(Json(load(&state, id).await?))
}

/// `POST /api/admin/raffles/{id}/advance`: expire the current winner now.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn advance(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<AdminRaffleView>> {
    RaffleService::new(state.pool())
        .force_advance(id, Utc::now())
        .await?;
    Ok(Json(load(&state, id).await?))
}

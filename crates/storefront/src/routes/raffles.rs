//! Customer raffle endpoints: browse, enter, and act on a win.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::instrument;

use brandbazaar_core::dto::{ClaimRaffle, OrderView, RaffleEntered, RaffleFilter, RaffleView};
use brandbazaar_core::{Paginated, RaffleId, UserId};

use crate::db::RaffleRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::services::raffle::RaffleService;
use crate::state::AppState;

async fn load_view(state: &AppState, id: RaffleId, viewer: Option<UserId>) -> Result<RaffleView> {
    RaffleRepository::new(state.pool())
        .get(id, viewer, false)
        .await?
        .map(|listing| listing.view(viewer))
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))
}

/// `GET /api/raffles`
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiQuery(filter): ApiQuery<RaffleFilter>,
) -> Result<Json<Paginated<RaffleView>>> {
    let viewer = user.map(|u| u.id);
    let page = RaffleRepository::new(state.pool())
        .list(&filter, viewer, false)
        .await?;
    Ok(Json(page.map(|listing| listing.view(viewer))))
}

/// `GET /api/raffles/{id}`
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<RaffleView>> {
    Ok(Json(load_view(&state, id, user.map(|u| u.id)).await?))
}

/// `POST /api/raffles/{id}/enter`
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn enter(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<(StatusCode, Json<RaffleEntered>)> {
    let entered = RaffleService::new(state.pool())
        .enter(id, user.id, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(entered)))
}

/// `POST /api/raffles/{id}/claim`
#[instrument(skip(state, input), fields(user_id = %user.id))]
pub async fn claim(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RaffleId>,
    ApiJson(input): ApiJson<ClaimRaffle>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let order = RaffleService::new(state.pool())
        .claim(id, user.id, &input, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `POST /api/raffles/{id}/decline`
#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn decline(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<RaffleId>,
) -> Result<Json<RaffleView>> {
    RaffleService::new(state.pool())
        .decline(id, user.id, Utc::now())
        .await?;
    Ok(Json(load_view(&state, id, Some(user.id)).await?))
}

//! User management: roles and XP.

use axum::{Json, extract::State};
use tracing::instrument;

use brandbazaar_core::dto::{AdjustXp, AdminUserView, SetRole, UserFilter};
use brandbazaar_core::{Paginated, UserId, Validate};
use brandbazaar_storefront::db::UserRepository;
use brandbazaar_storefront::extract::{ApiJson, ApiPath, ApiQuery};

use crate::db::UserAdminRepository;
use crate::error::{AppError, Result, not_found};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// `GET /api/admin/users`
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Result<Json<Paginated<AdminUserView>>> {
    let users = UserAdminRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(users.map(|u| u.admin_view())))
}

/// `GET /api/admin/users/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<AdminUserView>> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(|u| Json(u.admin_view()))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// `POST /api/admin/users/{id}/role`
///
/// Admins can't change their own role, so the back office always keeps at
/// least the acting admin.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<SetRole>,
) -> Result<Json<AdminUserView>> {
    if id == admin.id {
        return Err(AppError::Forbidden("Cannot change your own role".to_string()));
    }
    let user = UserRepository::new(state.pool())
        .set_role(id, input.role)
        .await
        .map_err(not_found("User"))?;
    tracing::info!(user_id = %id, role = %input.role, "user role changed");
    Ok(Json(user.admin_view()))
}

/// `POST /api/admin/users/{id}/xp`. XP never drops below zero.
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn adjust_xp(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(input): ApiJson<AdjustXp>,
) -> Result<Json<AdminUserView>> {
    input.validate()?;
    let user = UserRepository::new(state.pool())
        .adjust_xp(id, input.delta)
        .await
        .map_err(not_found("User"))?;
    tracing::info!(user_id = %id, delta = input.delta, xp = user.xp, "user xp adjusted");
    Ok(Json(user.admin_view()))
}

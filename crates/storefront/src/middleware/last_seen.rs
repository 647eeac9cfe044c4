//! Records `users.lastSeenAt` for signed-in requests, at most every 5 minutes.
//!
//! The time of the last write is kept in the session so the check costs no
//! database round-trip.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Minimum seconds between `lastSeenAt` writes.
pub const LAST_SEEN_INTERVAL_SECS: i64 = 5 * 60;

/// Whether enough time has passed since `last` to write again.
#[must_use]
pub fn is_due(last: Option<i64>, now: i64) -> bool {
    last.is_none_or(|last| now - last >= LAST_SEEN_INTERVAL_SECS)
}

pub async fn last_seen_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(session) = request.extensions().get::<Session>().cloned() {
        touch(&state, &session).await;
    }
    next.run(request).await
}

async fn touch(state: &AppState, session: &Session) {
    let Ok(Some(user)) = session.get::<CurrentUser>(session_keys::CURRENT_USER).await else {
        return;
    };
    let now = Utc::now();
    let last = session
        .get::<i64>(session_keys::LAST_SEEN)
        .await
        .ok()
        .flatten();
    if !is_due(last, now.timestamp()) {
        return;
    }

    if let Err(e) = UserRepository::new(state.pool())
        .touch_last_seen(user.id, now)
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "failed to record last seen");
        return;
    }
    if let Err(e) = session.insert(session_keys::LAST_SEEN, now.timestamp()).await {
        tracing::warn!(error = %e, "failed to store last seen in session");
    }
}

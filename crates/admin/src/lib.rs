//! BrandBazaar back office library.
//!
//! The admin JSON API: catalog management, order fulfilment, raffle setup and
//! winner selection, user roles and XP, and review moderation.
//!
//! # Security
//!
//! Every `/api/admin` route except login requires a session whose user has
//! the `admin` role. The session cookie is separate from the storefront's
//! and uses `SameSite=Strict`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod sweep;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Root span for a request; `request_id` is filled in by the request ID middleware.
pub fn make_request_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "admin_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
    )
}

/// Build the back-office application over any session store.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    routes::routes()
        .layer(sessions)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

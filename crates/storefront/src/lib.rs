//! BrandBazaar storefront library.
//!
//! The customer-facing JSON API plus everything the back office shares with
//! it: repositories, models, services (checkout, orders, raffles), error
//! handling, and the auth extractors.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::service::SignedCookie;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Root span for a request; `request_id` is filled in by the request ID middleware.
pub fn make_request_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = tracing::field::Empty,
    )
}

/// Build the full storefront application over any session store.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    routes::routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::last_seen_middleware,
        ))
        .layer(sessions)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, StatusCode, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{SentryConfig, StorefrontConfig};
    use crate::middleware::session_layer;

    /// An app whose pool never connects; only routes that skip the database work.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://bb@127.0.0.1:1/bb"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            catalog_cache_ttl: Duration::from_secs(60),
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://bb@127.0.0.1:1/bb")
            .unwrap();
        let key = config.cookie_key().unwrap();
        app(
            AppState::new(config, pool),
            session_layer(MemoryStore::default(), false, key),
        )
    }

    async fn send(method: Method, uri: &str, body: Option<&str>) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        test_app()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = send(Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_readiness_without_database() {
        let response = send(Method::GET, "/health/ready", None).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/health")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let response = send(Method::GET, "/api/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn test_protected_routes_require_auth() {
        for (method, uri) in [
            (Method::GET, "/api/auth/me"),
            (Method::GET, "/api/orders"),
            (Method::GET, "/api/wishlist"),
            (Method::GET, "/api/account"),
            (Method::GET, "/api/account/addresses"),
        ] {
            let response = send(method, uri, None).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(json(response).await["error"], "Authentication required");
        }
    }

    #[tokio::test]
    async fn test_checkout_requires_auth() {
        let response = send(Method::POST, "/api/checkout", Some("{}")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_cart_needs_no_database() {
        let response = send(Method::GET, "/api/cart", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["itemCount"], 0);
        assert_eq!(body["lines"].as_array().unwrap().len(), 0);
        assert_eq!(body["shippingCost"], body["subtotal"]);
    }

    #[tokio::test]
    async fn test_register_validation_reports_fields() {
        let response = send(
            Method::POST,
            "/api/auth/register",
            Some(r#"{"email":"nope","password":"short","displayName":""}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json(response).await;
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = send(Method::POST, "/api/auth/login", Some("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_path_id_is_bad_request() {
        let response = send(Method::GET, "/api/orders/not-a-uuid", None).await;
        // Auth is checked before the path parses.
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(Method::GET, "/api/raffles/not-a-uuid", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_product_filter() {
        let response = send(Method::GET, "/api/products?minPrice=10&maxPrice=5", None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

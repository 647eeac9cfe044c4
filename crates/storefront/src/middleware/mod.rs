//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Last-seen tracking
//! 7. Rate limiting (governor), per route group

pub mod auth;
pub mod last_seen;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use last_seen::last_seen_middleware;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, session_layer};

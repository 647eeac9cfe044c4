//! HTTP middleware stack for the back office.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (one span per request)
//! 3. Request ID (from the storefront crate)
//! 4. Security headers (from the storefront crate)
//! 5. Session layer (`bb_admin_session`, `SameSite=Strict`)
//! 6. Rate limiting on `/api/admin/auth`
//!
//! Authentication is per handler via [`RequireAdmin`].

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use brandbazaar_storefront::middleware::{
    auth_rate_limiter, request_id_middleware, security_headers_middleware,
};
pub use session::{create_session_layer, session_layer};

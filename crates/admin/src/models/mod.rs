//! Back-office models.
//!
//! Catalog, order, raffle, and user rows come from the storefront crate;
//! only the admin session identity lives here.

pub mod session;

pub use session::CurrentAdmin;
pub use session::keys as session_keys;

//! Session-related types.
//!
//! Types stored in the session for authentication state and guest data.

use serde::{Deserialize, Serialize};

use brandbazaar_core::{Email, UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. Role
/// changes take effect on the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub role: UserRole,
}

/// Session keys.
pub mod keys {
    /// The logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// The shopping cart (`brandbazaar_core::dto::Cart`).
    pub const CART: &str = "cart";

    /// Recently viewed product IDs, newest first.
    pub const RECENTLY_VIEWED: &str = "recently_viewed";

    /// Unix timestamp of the last `lastSeenAt` write.
    pub const LAST_SEEN: &str = "last_seen";
}

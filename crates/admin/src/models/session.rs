//! Session-stored admin identity.

use serde::{Deserialize, Serialize};

use brandbazaar_core::{Email, UserId};
use brandbazaar_storefront::models::User;

/// The signed-in back-office user.
///
/// Only written after a login that checked the `admin` role. `RequireAdmin`
/// re-checks the role on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

impl From<&User> for CurrentAdmin {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.display_name.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// The logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

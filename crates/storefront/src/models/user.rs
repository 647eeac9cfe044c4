//! User domain types.

use chrono::{DateTime, Utc};

use brandbazaar_core::dto::{AdminUserView, UserView};
use brandbazaar_core::{Email, LevelProgress, UserId, UserRole};

use super::session::CurrentUser;

/// A marketplace account.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
    pub xp: i32,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn level(&self) -> LevelProgress {
        LevelProgress::from_xp(i64::from(self.xp))
    }

    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            level: self.level(),
            created_at: self.created_at,
        }
    }

    #[must_use]
    pub fn admin_view(&self) -> AdminUserView {
        AdminUserView {
            user: self.view(),
            last_seen_at: self.last_seen_at,
            updated_at: self.updated_at,
        }
    }

    /// The identity stored in the session after login.
    #[must_use]
    pub fn session_identity(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

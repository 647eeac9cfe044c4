//! Registration, login, and profile payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, LevelProgress, UserId, UserRole};
use crate::validation::{Validate, ValidationErrors};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum password length (bounds hashing cost).
pub const MAX_PASSWORD_LENGTH: usize = 128;
/// Maximum display name length.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if let Err(e) = Email::parse(email) {
        errors.add("email", e.to_string());
    }
}

/// `POST /api/auth/register`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl Validate for RegisterUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        let len = self.password.chars().count();
        errors.check(
            len >= MIN_PASSWORD_LENGTH,
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        );
        errors.check(
            len <= MAX_PASSWORD_LENGTH,
            "password",
            format!("must be at most {MAX_PASSWORD_LENGTH} characters"),
        );
        errors.length("displayName", &self.display_name, 1, MAX_DISPLAY_NAME_LENGTH);
        errors.into_result()
    }
}

/// `POST /api/auth/login` and `POST /api/admin/auth/login`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

impl Validate for LoginUser {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_email(&mut errors, &self.email);
        errors.check(!self.password.is_empty(), "password", "is required");
        errors.into_result()
    }
}

/// `PATCH /api/account`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub display_name: String,
}

impl Validate for UpdateProfile {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.length("displayName", &self.display_name, 1, MAX_DISPLAY_NAME_LENGTH);
        errors.into_result()
    }
}

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
    pub role: UserRole,
    pub level: LevelProgress,
    pub created_at: DateTime<Utc>,
}

/// The signed-in user's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub order_count: i64,
    pub raffle_entry_count: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_register_valid() {
        let req = RegisterUser {
            email: "Kim@Example.com".to_string(),
            password: "correct horse".to_string(),
            display_name: "Kim".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_reports_every_field() {
        let req = RegisterUser {
            email: "no-at-sign".to_string(),
            password: "short".to_string(),
            display_name: "   ".to_string(),
        };
        let err = req.validate().unwrap_err();
        let fields: Vec<_> = err.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "displayName"]);
    }

    #[test]
    fn test_register_deserializes_camel_case() {
        let req: RegisterUser = serde_json::from_str(
            r#"{"email":"a@b.co","password":"password1","displayName":"A"}"#,
        )
        .unwrap();
        assert_eq!(req.display_name, "A");
    }

    #[test]
    fn test_login_requires_password() {
        let req = LoginUser {
            email: "a@b.co".to_string(),
            password: String::new(),
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.errors()[0].field, "password");
    }
}

//! User repository for database operations.
//!
//! Emails are stored lower-cased and matched through the `lower(email)` unique
//! index, so lookups never depend on caller casing.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use brandbazaar_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::User;

const SELECT_USER: &str = r#"
    SELECT id, email, "displayName", role, xp, "lastSeenAt", "createdAt", "updatedAt"
    FROM users
"#;

/// Counts shown on the account page.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub order_count: i64,
    pub raffle_entry_count: i64,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{SELECT_USER} WHERE lower(email) = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("{SELECT_USER} WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user together with their password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let hash: Option<String> =
            sqlx::query_scalar(r#"SELECT "passwordHash" FROM users WHERE id = $1"#)
                .bind(user.id)
                .fetch_optional(self.pool)
                .await?;

        Ok(hash.map(|h| (user, h)))
    }

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        display_name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, "displayName", "passwordHash", role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, "displayName", role, xp, "lastSeenAt", "createdAt", "updatedAt"
            "#,
        )
        .bind(UserId::generate())
        .bind(email.as_str())
        .bind(display_name.trim())
        .bind(password_hash)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::unique("email already exists"))?;

        Ok(user)
    }

    /// Change a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_display_name(
        &self,
        id: UserId,
        display_name: &str,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET "displayName" = $2, "updatedAt" = now()
            WHERE id = $1
            RETURNING id, email, "displayName", role, xp, "lastSeenAt", "createdAt", "updatedAt"
            "#,
        )
        .bind(id)
        .bind(display_name.trim())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = $2, "updatedAt" = now()
            WHERE id = $1
            RETURNING id, email, "displayName", role, xp, "lastSeenAt", "createdAt", "updatedAt"
            "#,
        )
        .bind(id)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Adjust XP by `delta` outside any wider transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn adjust_xp(&self, id: UserId, delta: i32) -> Result<User, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        add_xp(&mut conn, id, delta).await?;
        drop(conn);
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Record activity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_seen(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(r#"UPDATE users SET "lastSeenAt" = $2 WHERE id = $1"#)
            .bind(id)
            .bind(at)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Order and raffle entry counts for the account page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn activity_counts(&self, id: UserId) -> Result<ActivityCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, ActivityCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders WHERE "userId" = $1) AS "orderCount",
                (SELECT COUNT(*) FROM raffle_entry WHERE "userId" = $1) AS "raffleEntryCount"
            "#,
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(counts)
    }
}

/// Add `delta` XP inside the caller's transaction, flooring at zero.
///
/// Returns the new XP total.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn add_xp(
    conn: &mut PgConnection,
    id: UserId,
    delta: i32,
) -> Result<i32, RepositoryError> {
    sqlx::query_scalar::<_, i32>(
        r#"
        UPDATE users SET xp = GREATEST(xp + $2, 0), "updatedAt" = now()
        WHERE id = $1
        RETURNING xp
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Lock a user row so per-user book-keeping (default address, default card)
/// is serialized across concurrent requests.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the user doesn't exist.
pub async fn lock_owner(conn: &mut PgConnection, id: UserId) -> Result<(), RepositoryError> {
    sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    Ok(())
}

/// Lock a user row and return their XP.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_xp(conn: &mut PgConnection, id: UserId) -> Result<Option<i32>, RepositoryError> {
    let xp = sqlx::query_scalar("SELECT xp FROM users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(xp)
}

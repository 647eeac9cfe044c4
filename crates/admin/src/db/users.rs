//! User search for the back office.

use sqlx::PgPool;

use brandbazaar_core::Paginated;
use brandbazaar_core::dto::UserFilter;
use brandbazaar_storefront::models::User;

use super::RepositoryError;

const USER_FILTER: &str = r#"
    WHERE ($1::user_role IS NULL OR role = $1)
      AND ($2::text IS NULL OR email ILIKE $2 OR "displayName" ILIKE $2)
"#;

pub struct UserAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserAdminRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Users matching the role and search filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &UserFilter) -> Result<Paginated<User>, RepositoryError> {
        let page = filter.page_request();
        let pattern = filter.search_pattern();

        let count_sql = format!("SELECT COUNT(*) FROM users {USER_FILTER}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.role)
            .bind(pattern.as_deref())
            .fetch_one(self.pool)
            .await?;

        let sql = format!(
            r#"SELECT id, email, "displayName", role, xp, "lastSeenAt", "createdAt", "updatedAt"
               FROM users {USER_FILTER}
               ORDER BY "createdAt" DESC, id
               LIMIT $3 OFFSET $4"#
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(filter.role)
            .bind(pattern.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(users, page, total))
    }
}

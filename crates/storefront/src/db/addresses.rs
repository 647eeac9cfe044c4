//! Address book.
//!
//! At most one address per user is the default. The first address a user
//! saves becomes the default, and setting a new default clears the others in
//! the same transaction. Every write locks the owning user row first, so
//! concurrent requests for one user run one after another.

use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::{CreateAddress, UpdateAddress};
use brandbazaar_core::{AddressId, UserId};

use super::RepositoryError;
use super::users::lock_owner;
use crate::models::Address;

const SELECT_ADDRESS: &str = r#"
    SELECT id, "userId", label, "fullName", line1, line2, city, region, "postalCode",
           country, phone, "isDefault", "createdAt"
    FROM address
"#;

pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let sql =
            format!(r#"{SELECT_ADDRESS} WHERE "userId" = $1 ORDER BY "isDefault" DESC, "createdAt""#);
        let rows = sqlx::query_as::<_, Address>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// An address owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let sql = format!(r#"{SELECT_ADDRESS} WHERE id = $1 AND "userId" = $2"#);
        let row = sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &CreateAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;

        let existing: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM address WHERE "userId" = $1"#)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let is_default = input.is_default || existing == 0;
        if is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let a = &input.address;
        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO address (id, "userId", label, "fullName", line1, line2, city, region,
                                 "postalCode", country, phone, "isDefault")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, "userId", label, "fullName", line1, line2, city, region, "postalCode",
                      country, phone, "isDefault", "createdAt"
            "#,
        )
        .bind(AddressId::generate())
        .bind(user_id)
        .bind(input.label.trim())
        .bind(a.full_name.trim())
        .bind(a.line1.trim())
        .bind(a.line2.as_deref())
        .bind(a.city.trim())
        .bind(a.region.trim())
        .bind(a.postal_code.trim())
        .bind(&a.country)
        .bind(a.phone.as_deref())
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AddressId,
        input: &UpdateAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;

        let sql = format!(r#"{SELECT_ADDRESS} WHERE id = $1 AND "userId" = $2 FOR UPDATE"#);
        let current = sqlx::query_as::<_, Address>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut label = current.label.clone();
        let mut a = current.shipping();
        input.apply(&mut label, &mut a);

        let is_default = match input.is_default {
            Some(true) => {
                clear_default(&mut tx, user_id).await?;
                true
            }
            Some(false) => false,
            None => current.is_default,
        };

        let address = sqlx::query_as::<_, Address>(
            r#"
            UPDATE address
            SET label = $2, "fullName" = $3, line1 = $4, line2 = $5, city = $6, region = $7,
                "postalCode" = $8, country = $9, phone = $10, "isDefault" = $11
            WHERE id = $1
            RETURNING id, "userId", label, "fullName", line1, line2, city, region, "postalCode",
                      country, phone, "isDefault", "createdAt"
            "#,
        )
        .bind(id)
        .bind(&label)
        .bind(&a.full_name)
        .bind(&a.line1)
        .bind(a.line2.as_deref())
        .bind(&a.city)
        .bind(&a.region)
        .bind(&a.postal_code)
        .bind(&a.country)
        .bind(a.phone.as_deref())
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. If it was the default, the oldest remaining one
    /// takes over.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address isn't the user's.
    pub async fn delete(&self, user_id: UserId, id: AddressId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;

        let was_default: bool = sqlx::query_scalar(
            r#"DELETE FROM address WHERE id = $1 AND "userId" = $2 RETURNING "isDefault""#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                r#"
                UPDATE address SET "isDefault" = true
                WHERE id = (SELECT id FROM address WHERE "userId" = $1 ORDER BY "createdAt" LIMIT 1)
                "#,
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

async fn clear_default(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    sqlx::query(r#"UPDATE address SET "isDefault" = false WHERE "userId" = $1 AND "isDefault""#)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

//! Saved payment methods.
//!
//! Only tokenized card metadata is stored. Default handling mirrors the
//! address book: first card is the default, and a new default clears the rest.

use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::CreatePaymentMethod;
use brandbazaar_core::{PaymentMethodId, UserId};

use super::RepositoryError;
use super::users::lock_owner;
use crate::models::PaymentMethod;

const SELECT_PAYMENT_METHOD: &str = r#"
    SELECT id, "userId", brand, last4, "expMonth", "expYear", "holderName", "isDefault", "createdAt"
    FROM payment_method
"#;

pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let sql = format!(
            r#"{SELECT_PAYMENT_METHOD} WHERE "userId" = $1 ORDER BY "isDefault" DESC, "createdAt""#
        );
        let rows = sqlx::query_as::<_, PaymentMethod>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// A payment method owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let sql = format!(r#"{SELECT_PAYMENT_METHOD} WHERE id = $1 AND "userId" = $2"#);
        let row = sqlx::query_as::<_, PaymentMethod>(&sql)
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
        input: &CreatePaymentMethod,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;

        let existing: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM payment_method WHERE "userId" = $1"#)
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        let is_default = input.is_default || existing == 0;
        if is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_method (id, "userId", brand, last4, "expMonth", "expYear",
                                        "holderName", "isDefault")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, "userId", brand, last4, "expMonth", "expYear", "holderName",
                      "isDefault", "createdAt"
            "#,
        )
        .bind(PaymentMethodId::generate())
        .bind(user_id)
        .bind(input.brand.as_str())
        .bind(&input.last4)
        .bind(i32::try_from(input.exp_month).unwrap_or_default())
        .bind(input.exp_year)
        .bind(input.holder_name.trim())
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(method)
    }

    /// Make a payment method the user's default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method isn't the user's.
    pub async fn set_default(
        &self,
        user_id: UserId,
        id: PaymentMethodId,
    ) -> Result<PaymentMethod, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;
        clear_default(&mut tx, user_id).await?;

        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_method SET "isDefault" = true
            WHERE id = $1 AND "userId" = $2
            RETURNING id, "userId", brand, last4, "expMonth", "expYear", "holderName",
                      "isDefault", "createdAt"
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(method)
    }

    /// Delete a payment method, promoting the oldest remaining one if needed.
    ///
    /// Orders keep their history; their `paymentMethodId` is set to null.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method isn't the user's.
    pub async fn delete(&self, user_id: UserId, id: PaymentMethodId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        lock_owner(&mut tx, user_id).await?;

        let was_default: bool = sqlx::query_scalar(
            r#"DELETE FROM payment_method WHERE id = $1 AND "userId" = $2 RETURNING "isDefault""#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                r#"
                UPDATE payment_method SET "isDefault" = true
                WHERE id = (
                    SELECT id FROM payment_method WHERE "userId" = $1 ORDER BY "createdAt" LIMIT 1
                )
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
    sqlx::query(
        r#"UPDATE payment_method SET "isDefault" = false WHERE "userId" = $1 AND "isDefault""#,
    )
    .bind(user_id)
    .execute(conn)
    .await?;
    Ok(())
}

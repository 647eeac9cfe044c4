//! Raffles, entries, and winner-selection state.
//!
//! Everything that changes a raffle's draw state runs against a row locked
//! with [`lock`], so concurrent entries, claims, and sweeps serialize on the
//! raffle row.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use brandbazaar_core::dto::{RaffleEntryView, RaffleFilter};
use brandbazaar_core::{EntryStatus, Paginated, RaffleEntryId, RaffleId, RaffleStatus, UserId};

use super::RepositoryError;
use crate::models::{Raffle, RaffleEntry, RaffleListing};

/// Raffle columns, qualified with the `r` alias.
pub const RAFFLE_COLUMNS: &str = r#"
    r.id, r.title, r.description, r."productId", r."entryPrice", r."xpReward", r."minLevel",
    r."maxEntries", r."startsAt", r."endsAt", r.status, r."purchaseWindowHours",
    r."winnerSelectionStartedAt", r."currentWinnerId", r."winnerPurchaseDeadline",
    r."createdAt", r."updatedAt"
"#;

/// Listing query. `$1` is the viewer (nullable).
const SELECT_LISTING: &str = r#"
    SELECT r.id, r.title, r.description, r."productId", r."entryPrice", r."xpReward",
           r."minLevel", r."maxEntries", r."startsAt", r."endsAt", r.status,
           r."purchaseWindowHours", r."winnerSelectionStartedAt", r."currentWinnerId",
           r."winnerPurchaseDeadline", r."createdAt", r."updatedAt",
           p.name AS "productName", p.slug AS "productSlug",
           (SELECT COUNT(*) FROM raffle_entry e WHERE e."raffleId" = r.id) AS "entryCount",
           (SELECT e.status FROM raffle_entry e
             WHERE e."raffleId" = r.id AND e."userId" = $1) AS "myEntryStatus"
    FROM raffle r
    LEFT JOIN product p ON p.id = r."productId"
"#;

const ENTRY_COLUMNS: &str = r#"id, "raffleId", "userId", status, "createdAt", "resolvedAt""#;

/// Entry row joined with its user, for the back office.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
struct EntryWithUserRow {
    #[sqlx(flatten)]
    entry: RaffleEntry,
    user_email: Option<String>,
    display_name: Option<String>,
}

impl From<EntryWithUserRow> for RaffleEntryView {
    fn from(row: EntryWithUserRow) -> Self {
        Self {
            id: row.entry.id,
            raffle_id: row.entry.raffle_id,
            user_id: row.entry.user_id,
            user_email: row.user_email,
            display_name: row.display_name,
            status: row.entry.status,
            created_at: row.entry.created_at,
            resolved_at: row.entry.resolved_at,
        }
    }
}

impl From<RaffleEntry> for RaffleEntryView {
    fn from(entry: RaffleEntry) -> Self {
        Self {
            id: entry.id,
            raffle_id: entry.raffle_id,
            user_id: entry.user_id,
            user_email: None,
            display_name: None,
            status: entry.status,
            created_at: entry.created_at,
            resolved_at: entry.resolved_at,
        }
    }
}

pub struct RaffleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RaffleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List raffles, soonest-ending first. Drafts only appear for the back office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &RaffleFilter,
        viewer: Option<UserId>,
        include_drafts: bool,
    ) -> Result<Paginated<RaffleListing>, RepositoryError> {
        let page = filter.page_request();
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM raffle r
            WHERE ($1 OR r.status <> 'draft') AND ($2::raffle_status IS NULL OR r.status = $2)
            "#,
        )
        .bind(include_drafts)
        .bind(filter.status)
        .fetch_one(self.pool)
        .await?;

        let sql = format!(
            r#"{SELECT_LISTING}
               WHERE ($2 OR r.status <> 'draft') AND ($3::raffle_status IS NULL OR r.status = $3)
               ORDER BY r."endsAt" DESC, r.id
               LIMIT $4 OFFSET $5"#
        );
        let items = sqlx::query_as::<_, RaffleListing>(&sql)
            .bind(viewer)
            .bind(include_drafts)
            .bind(filter.status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.pool)
            .await?;

        Ok(Paginated::new(items, page, total))
    }

    /// One raffle with counts and the viewer's entry status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        id: RaffleId,
        viewer: Option<UserId>,
        include_drafts: bool,
    ) -> Result<Option<RaffleListing>, RepositoryError> {
        let sql = format!(r#"{SELECT_LISTING} WHERE r.id = $2 AND ($3 OR r.status <> 'draft')"#);
        let listing = sqlx::query_as::<_, RaffleListing>(&sql)
            .bind(viewer)
            .bind(id)
            .bind(include_drafts)
            .fetch_optional(self.pool)
            .await?;
        Ok(listing)
    }

    /// Entries with user details, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn entries(&self, id: RaffleId) -> Result<Vec<RaffleEntryView>, RepositoryError> {
        let rows = sqlx::query_as::<_, EntryWithUserRow>(
            r#"
            SELECT e.id, e."raffleId", e."userId", e.status, e."createdAt", e."resolvedAt",
                   u.email AS "userEmail", u."displayName"
            FROM raffle_entry e
            LEFT JOIN users u ON u.id = e."userId"
            WHERE e."raffleId" = $1
            ORDER BY e."createdAt", e.id
            "#,
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(RaffleEntryView::from).collect())
    }

    /// Drawing raffles whose winner's deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<RaffleId>, RepositoryError> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT id FROM raffle
            WHERE status = 'drawing' AND "winnerPurchaseDeadline" <= $1
            ORDER BY "winnerPurchaseDeadline"
            "#,
        )
        .bind(now)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }
}

/// Lock a raffle row for the rest of the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(conn: &mut PgConnection, id: RaffleId) -> Result<Option<Raffle>, RepositoryError> {
    let sql = format!("SELECT {RAFFLE_COLUMNS} FROM raffle r WHERE r.id = $1 FOR UPDATE");
    let raffle = sqlx::query_as::<_, Raffle>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(raffle)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn entry_count(conn: &mut PgConnection, id: RaffleId) -> Result<i64, RepositoryError> {
    let count = sqlx::query_scalar(r#"SELECT COUNT(*) FROM raffle_entry WHERE "raffleId" = $1"#)
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count)
}

/// The user's entry in a raffle, if any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn entry_for(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
    user_id: UserId,
) -> Result<Option<RaffleEntry>, RepositoryError> {
    let sql = format!(
        r#"SELECT {ENTRY_COLUMNS} FROM raffle_entry WHERE "raffleId" = $1 AND "userId" = $2"#
    );
    let entry = sqlx::query_as::<_, RaffleEntry>(&sql)
        .bind(raffle_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(entry)
}

/// # Errors
///
/// Returns `RepositoryError::Conflict` if the user already entered.
pub async fn insert_entry(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
    user_id: UserId,
) -> Result<RaffleEntry, RepositoryError> {
    let sql = format!(
        r#"INSERT INTO raffle_entry (id, "raffleId", "userId") VALUES ($1, $2, $3)
           RETURNING {ENTRY_COLUMNS}"#
    );
    let entry = sqlx::query_as::<_, RaffleEntry>(&sql)
        .bind(RaffleEntryId::generate())
        .bind(raffle_id)
        .bind(user_id)
        .fetch_one(conn)
        .await
        .map_err(RepositoryError::unique("already entered"))?;
    Ok(entry)
}

/// Entries still eligible to be drawn.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn draw_pool(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
) -> Result<Vec<(RaffleEntryId, UserId)>, RepositoryError> {
    let pool = sqlx::query_as(
        r#"
        SELECT id, "userId" FROM raffle_entry
        WHERE "raffleId" = $1 AND status = 'entered'
        ORDER BY id
        "#,
    )
    .bind(raffle_id)
    .fetch_all(conn)
    .await?;
    Ok(pool)
}

/// Set the entry currently `selected` in a raffle to `status`.
///
/// Returns whether a selected entry existed.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn resolve_selected(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
    status: EntryStatus,
    now: DateTime<Utc>,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE raffle_entry SET status = $2, "resolvedAt" = $3
        WHERE "raffleId" = $1 AND status = 'selected'
        "#,
    )
    .bind(raffle_id)
    .bind(status)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn mark_selected(
    conn: &mut PgConnection,
    entry_id: RaffleEntryId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE raffle_entry SET status = 'selected' WHERE id = $1")
        .bind(entry_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Record the drawn winner and their deadline.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_winner(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
    winner: Option<UserId>,
    deadline: Option<DateTime<Utc>>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        UPDATE raffle
        SET "currentWinnerId" = $2, "winnerPurchaseDeadline" = $3, "updatedAt" = now()
        WHERE id = $1
        "#,
    )
    .bind(raffle_id)
    .bind(winner)
    .bind(deadline)
    .execute(conn)
    .await?;
    Ok(())
}

/// Move a raffle to `status`, stamping the selection start when it becomes `drawing`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_status(
    conn: &mut PgConnection,
    raffle_id: RaffleId,
    status: RaffleStatus,
    now: DateTime<Utc>,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        UPDATE raffle
        SET status = $2,
            "winnerSelectionStartedAt" = CASE WHEN $2 = 'drawing'::raffle_status
                                              THEN $3 ELSE "winnerSelectionStartedAt" END,
            "updatedAt" = now()
        WHERE id = $1
        "#,
    )
    .bind(raffle_id)
    .bind(status)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

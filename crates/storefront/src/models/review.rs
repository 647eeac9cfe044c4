//! Product review domain type.

use chrono::{DateTime, Utc};

use brandbazaar_core::dto::ReviewView;
use brandbazaar_core::{ProductId, ReviewId, UserId};

/// A review joined with its author's display name.
#[derive(Debug, Clone, sqlx::FromRow)]
#[sqlx(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub author: String,
    pub rating: i16,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    #[must_use]
    pub fn view(&self) -> ReviewView {
        ReviewView {
            id: self.id,
            product_id: self.product_id,
            user_id: self.user_id,
            author: self.author.clone(),
            rating: self.rating,
            title: self.title.clone(),
            body: self.body.clone(),
            created_at: self.created_at,
        }
    }
}

//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, ReviewId, UserId};
use crate::validation::{Validate, ValidationErrors};

pub const MAX_REVIEW_BODY_LENGTH: usize = 4_000;

/// `POST /api/products/{slug}/reviews`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub rating: i16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Validate for CreateReview {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.range("rating", self.rating, 1, 5);
        errors.length("title", &self.title, 0, 120);
        errors.length("body", &self.body, 0, MAX_REVIEW_BODY_LENGTH);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub author: String,
    pub rating: i16,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for rating in [0, 6] {
            let review = CreateReview {
                rating,
                title: String::new(),
                body: String::new(),
            };
            assert!(review.validate().is_err());
        }
        let ok = CreateReview {
            rating: 5,
            title: "Great".to_string(),
            body: "Fits true to size.".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_body_limit() {
        let review = CreateReview {
            rating: 3,
            title: String::new(),
            body: "x".repeat(MAX_REVIEW_BODY_LENGTH + 1),
        };
        assert!(review.validate().is_err());
    }
}

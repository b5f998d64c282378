use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::Pagination;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    /// 1-5 stars.
    #[schema(example = 4)]
    pub rating: i32,
    #[schema(example = "Great autumn views, crowded on weekends.")]
    pub body: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: i32,
    pub mountain_id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ReviewListItem {
    pub id: i32,
    pub user_id: i32,
    pub rating: i32,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReviewListResponse {
    pub data: Vec<ReviewListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ReviewListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl From<crate::entity::review::Model> for ReviewResponse {
    fn from(m: crate::entity::review::Model) -> Self {
        Self {
            id: m.id,
            mountain_id: m.mountain_id,
            user_id: m.user_id,
            rating: m.rating,
            body: m.body,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_review(req: &CreateReviewRequest) -> Result<(), AppError> {
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation("Rating must be 1-5".into()));
    }
    let body = req.body.trim();
    if body.is_empty() || body.chars().count() > 4000 {
        return Err(AppError::Validation(
            "Review body must be 1-4000 characters".into(),
        ));
    }
    Ok(())
}

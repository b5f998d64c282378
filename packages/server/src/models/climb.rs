use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::Pagination;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateClimbRequest {
    /// Date of the ascent (not in the future).
    #[schema(example = "2026-05-03")]
    pub climbed_on: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClimbResponse {
    pub id: i32,
    pub mountain_id: i32,
    pub user_id: i32,
    pub climbed_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ClimbListItem {
    pub id: i32,
    pub mountain_id: i32,
    pub user_id: i32,
    pub climbed_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClimbListResponse {
    pub data: Vec<ClimbListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ClimbListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl From<crate::entity::climb::Model> for ClimbResponse {
    fn from(m: crate::entity::climb::Model) -> Self {
        Self {
            id: m.id,
            mountain_id: m.mountain_id,
            user_id: m.user_id,
            climbed_on: m.climbed_on,
            notes: m.notes,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_climb(req: &CreateClimbRequest) -> Result<(), AppError> {
    if req.climbed_on > Utc::now().date_naive() {
        return Err(AppError::Validation(
            "Climb date must not be in the future".into(),
        ));
    }
    if let Some(ref notes) = req.notes
        && notes.chars().count() > 2000
    {
        return Err(AppError::Validation(
            "Notes must be at most 2000 characters".into(),
        ));
    }
    Ok(())
}

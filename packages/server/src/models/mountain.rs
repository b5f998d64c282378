use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::{double_option, validate_name, validate_photo_url};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMountainRequest {
    pub name: String,
    pub prefecture: String,
    pub elevation_m: i32,
    pub description: String,
    pub photo_url: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMountainRequest {
    pub name: Option<String>,
    pub prefecture: Option<String>,
    pub elevation_m: Option<i32>,
    pub description: Option<String>,
    /// PATCH semantics: absent = keep, null = clear, value = replace.
    #[serde(default, deserialize_with = "double_option")]
    pub photo_url: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MountainResponse {
    pub id: i32,
    pub name: String,
    pub prefecture: String,
    pub elevation_m: i32,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row; the Markdown description is omitted from list results.
#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct MountainListItem {
    pub id: i32,
    pub name: String,
    pub prefecture: String,
    pub elevation_m: i32,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MountainListResponse {
    pub data: Vec<MountainListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MountainListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl From<crate::entity::mountain::Model> for MountainResponse {
    fn from(m: crate::entity::mountain::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            prefecture: m.prefecture,
            elevation_m: m.elevation_m,
            description: m.description,
            photo_url: m.photo_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_mountain(req: &CreateMountainRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_prefecture(&req.prefecture)?;
    validate_elevation(req.elevation_m)?;
    validate_description(&req.description)?;
    if let Some(ref url) = req.photo_url {
        validate_photo_url(url)?;
    }
    Ok(())
}

pub fn validate_update_mountain(req: &UpdateMountainRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(ref prefecture) = req.prefecture {
        validate_prefecture(prefecture)?;
    }
    if let Some(elevation) = req.elevation_m {
        validate_elevation(elevation)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(Some(ref url)) = req.photo_url {
        validate_photo_url(url)?;
    }
    Ok(())
}

fn validate_prefecture(prefecture: &str) -> Result<(), AppError> {
    let prefecture = prefecture.trim();
    if prefecture.is_empty() || prefecture.chars().count() > 64 {
        return Err(AppError::Validation(
            "Prefecture must be 1-64 characters".into(),
        ));
    }
    Ok(())
}

fn validate_elevation(elevation_m: i32) -> Result<(), AppError> {
    if !(1..=9000).contains(&elevation_m) {
        return Err(AppError::Validation(
            "Elevation must be 1-9000 meters".into(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.len() > 100_000 {
        return Err(AppError::Validation(
            "Description must be at most 100KB".into(),
        ));
    }
    Ok(())
}

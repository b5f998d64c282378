use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_BATCH_LIMIT: u32 = 100;

/// Body of the photo backfill endpoint.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct PhotoBatchRequest {
    /// Maximum mountains to scan (1-100, default 100).
    pub limit: Option<u32>,
    /// Compute the candidate set without persisting.
    #[serde(default, rename = "dryRun")]
    pub dry_run: bool,
    /// Rescan mountains that already have a photo.
    #[serde(default)]
    pub force: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoBatchResponse {
    /// False when any per-mountain lookup failed in transport.
    pub success: bool,
    pub force: bool,
    pub dry_run: bool,
    /// Mountains considered in this run.
    pub scanned: usize,
    /// Rows persisted (always 0 on a dry run).
    pub applied: usize,
    /// Mountains with no discoverable image — a normal outcome, not an error.
    pub skipped: usize,
    /// Mountains whose lookup failed in transport.
    pub failed: usize,
    pub updates: Vec<PhotoUpdate>,
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpdate {
    pub mountain_id: i32,
    pub name: String,
    pub photo_url: String,
}

pub fn validate_photo_batch(req: &PhotoBatchRequest) -> Result<u32, AppError> {
    let limit = req.limit.unwrap_or(DEFAULT_BATCH_LIMIT);
    if !(1..=100).contains(&limit) {
        return Err(AppError::Validation("limit must be 1-100".into()));
    }
    Ok(limit)
}

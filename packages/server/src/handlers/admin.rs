use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::{instrument, warn};

use crate::entity::mountain;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::admin::{
    PhotoBatchRequest, PhotoBatchResponse, PhotoUpdate, validate_photo_batch,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/mountains/photos",
    tag = "Admin",
    operation_id = "refreshMountainPhotos",
    summary = "Backfill mountain photos from Wikipedia",
    description = "Scans up to `limit` mountains lacking a photo (or all mountains under `force`), discovers a candidate image per mountain through the Wikipedia page-image API, and persists discovered URLs unless `dryRun` is set. Mountains with no discoverable image are skipped and counted; per-mountain transport failures are counted without failing the batch. Admin only.",
    request_body = PhotoBatchRequest,
    responses(
        (status = 200, description = "Batch outcome", body = PhotoBatchResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn refresh_mountain_photos(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<PhotoBatchRequest>,
) -> Result<Json<PhotoBatchResponse>, AppError> {
    auth_user.require_admin(&state).await?;
    let limit = validate_photo_batch(&payload)?;

    let mut select = mountain::Entity::find();
    if !payload.force {
        select = select.filter(mountain::Column::PhotoUrl.is_null());
    }
    let mountains = select
        .order_by_asc(mountain::Column::Id)
        .limit(Some(limit as u64))
        .all(&state.db)
        .await?;
    let scanned = mountains.len();

    // Per-mountain lookups are independent; run them concurrently.
    let lookups = mountains.into_iter().map(|m| {
        let commons = state.commons.clone();
        async move {
            let result = commons.discover_photo(&m.name).await;
            (m.id, m.name, result)
        }
    });
    let results = futures::future::join_all(lookups).await;

    let mut updates = Vec::new();
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for (mountain_id, name, result) in results {
        match result {
            Ok(Some(photo_url)) => updates.push(PhotoUpdate {
                mountain_id,
                name,
                photo_url,
            }),
            Ok(None) => skipped += 1,
            Err(err) => {
                warn!(mountain = %name, error = %err, "photo lookup failed");
                failed += 1;
            }
        }
    }

    let mut applied = 0usize;
    if !payload.dry_run {
        for update in &updates {
            let active = mountain::ActiveModel {
                id: Set(update.mountain_id),
                photo_url: Set(Some(update.photo_url.clone())),
                updated_at: Set(chrono::Utc::now()),
                ..Default::default()
            };
            mountain::Entity::update(active).exec(&state.db).await?;
            applied += 1;
        }
    }

    Ok(Json(PhotoBatchResponse {
        success: failed == 0,
        force: payload.force,
        dry_run: payload.dry_run,
        scanned,
        applied,
        skipped,
        failed,
        updates,
    }))
}

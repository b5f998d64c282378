use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::climb;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::climb::*;
use crate::state::AppState;

use super::image::check_rate_limit;
use super::mountain::find_mountain;

#[utoipa::path(
    post,
    path = "/{id}/climbs",
    tag = "Climbs",
    operation_id = "createClimb",
    summary = "Record a climb",
    description = "Records an ascent of a mountain for the authenticated user.",
    params(("id" = i32, Path, description = "Mountain ID")),
    request_body = CreateClimbRequest,
    responses(
        (status = 201, description = "Climb recorded", body = ClimbResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, payload), fields(mountain_id = id, user_id = auth_user.user_id))]
pub async fn create_climb(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateClimbRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_rate_limit(&state, &headers)?;
    validate_create_climb(&payload)?;

    find_mountain(&state.db, id).await?;

    let new_climb = climb::ActiveModel {
        user_id: Set(auth_user.user_id),
        mountain_id: Set(id),
        climbed_on: Set(payload.climbed_on),
        notes: Set(payload.notes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_climb.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ClimbResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/climbs",
    tag = "Climbs",
    operation_id = "listMountainClimbs",
    summary = "List climbs of a mountain",
    description = "Returns recorded ascents of a mountain, most recent first.",
    params(("id" = i32, Path, description = "Mountain ID"), ClimbListQuery),
    responses(
        (status = 200, description = "List of climbs", body = ClimbListResponse),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(mountain_id = id))]
pub async fn list_mountain_climbs(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ClimbListQuery>,
) -> Result<Json<ClimbListResponse>, AppError> {
    find_mountain(&state.db, id).await?;

    let select = climb::Entity::find().filter(climb::Column::MountainId.eq(id));
    list_climbs(&state.db, select, query).await
}

#[utoipa::path(
    get,
    path = "/climbs",
    tag = "Climbs",
    operation_id = "listMyClimbs",
    summary = "List the authenticated user's climbs",
    params(ClimbListQuery),
    responses(
        (status = 200, description = "List of climbs", body = ClimbListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_climbs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ClimbListQuery>,
) -> Result<Json<ClimbListResponse>, AppError> {
    let select = climb::Entity::find().filter(climb::Column::UserId.eq(auth_user.user_id));
    list_climbs(&state.db, select, query).await
}

async fn list_climbs(
    db: &DatabaseConnection,
    select: Select<climb::Entity>,
    query: ClimbListQuery,
) -> Result<Json<ClimbListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let total = select.clone().paginate(db, per_page).num_items().await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(climb::Column::ClimbedOn)
        .order_by_desc(climb::Column::Id)
        .select_only()
        .column(climb::Column::Id)
        .column(climb::Column::MountainId)
        .column(climb::Column::UserId)
        .column(climb::Column::ClimbedOn)
        .column(climb::Column::Notes)
        .column(climb::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ClimbListItem>()
        .all(db)
        .await?;

    Ok(Json(ClimbListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::review;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::review::*;
use crate::state::AppState;

use super::image::check_rate_limit;
use super::mountain::find_mountain;

#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "createReview",
    summary = "Review a mountain",
    description = "Posts a review for a mountain. One review per user per mountain; a second attempt returns 409.",
    params(("id" = i32, Path, description = "Mountain ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (CONFLICT)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, payload), fields(mountain_id = id, user_id = auth_user.user_id))]
pub async fn create_review(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    AppJson(payload): AppJson<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_rate_limit(&state, &headers)?;
    validate_create_review(&payload)?;

    find_mountain(&state.db, id).await?;

    let new_review = review::ActiveModel {
        user_id: Set(auth_user.user_id),
        mountain_id: Set(id),
        rating: Set(payload.rating),
        body: Set(payload.body.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_review
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("You have already reviewed this mountain".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}/reviews",
    tag = "Reviews",
    operation_id = "listMountainReviews",
    summary = "List reviews for a mountain",
    description = "Returns a mountain's reviews, newest first.",
    params(("id" = i32, Path, description = "Mountain ID"), ReviewListQuery),
    responses(
        (status = 200, description = "List of reviews", body = ReviewListResponse),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(mountain_id = id))]
pub async fn list_mountain_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    find_mountain(&state.db, id).await?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let select = review::Entity::find().filter(review::Column::MountainId.eq(id));

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_desc(review::Column::CreatedAt)
        .select_only()
        .column(review::Column::Id)
        .column(review::Column::UserId)
        .column(review::Column::Rating)
        .column(review::Column::Body)
        .column(review::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ReviewListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(ReviewListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::mountain;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::mountain::*;
use crate::state::AppState;

/// Find a mountain by ID or return 404.
pub(crate) async fn find_mountain<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<mountain::Model, AppError> {
    mountain::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Mountain not found".into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Mountains",
    operation_id = "createMountain",
    summary = "Create a new mountain",
    description = "Creates a mountain record. Admin only.",
    request_body = CreateMountainRequest,
    responses(
        (status = 201, description = "Mountain created", body = MountainResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_mountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMountainRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin(&state).await?;
    validate_create_mountain(&payload)?;

    let now = chrono::Utc::now();
    let new_mountain = mountain::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        prefecture: Set(payload.prefecture.trim().to_string()),
        elevation_m: Set(payload.elevation_m),
        description: Set(payload.description),
        photo_url: Set(payload.photo_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_mountain
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("A mountain with this name already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(MountainResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Mountains",
    operation_id = "listMountains",
    summary = "List mountains with pagination and search",
    description = "Returns a paginated list of mountains with optional case-insensitive name search and sorting by `created_at` (default, desc), `name`, or `elevation_m`. Descriptions are omitted from list results.",
    params(MountainListQuery),
    responses(
        (status = 200, description = "List of mountains", body = MountainListResponse),
        (status = 400, description = "Invalid sort field (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_mountains(
    State(state): State<AppState>,
    Query(query): Query<MountainListQuery>,
) -> Result<Json<MountainListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = mountain::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(mountain::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => mountain::Column::CreatedAt,
        "name" => mountain::Column::Name,
        "elevation_m" => mountain::Column::ElevationM,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, name, elevation_m".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    select = select.order_by(sort_column, sort_order);
    let total_pages = total.div_ceil(per_page);

    let data = select
        .select_only()
        .column(mountain::Column::Id)
        .column(mountain::Column::Name)
        .column(mountain::Column::Prefecture)
        .column(mountain::Column::ElevationM)
        .column(mountain::Column::PhotoUrl)
        .column(mountain::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<MountainListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(MountainListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Mountains",
    operation_id = "getMountain",
    summary = "Get a mountain by ID",
    params(("id" = i32, Path, description = "Mountain ID")),
    responses(
        (status = 200, description = "Mountain details", body = MountainResponse),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_mountain(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MountainResponse>, AppError> {
    let model = find_mountain(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Mountains",
    operation_id = "updateMountain",
    summary = "Update an existing mountain",
    description = "Partially updates a mountain using PATCH semantics — only provided fields are modified, and `photo_url: null` clears the photo. Admin only. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Mountain ID")),
    request_body = UpdateMountainRequest,
    responses(
        (status = 200, description = "Mountain updated", body = MountainResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Mountain not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_mountain(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMountainRequest>,
) -> Result<Json<MountainResponse>, AppError> {
    auth_user.require_admin(&state).await?;
    validate_update_mountain(&payload)?;

    if payload == UpdateMountainRequest::default() {
        let existing = find_mountain(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_mountain(&txn, id).await?;
    let mut active: mountain::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(ref prefecture) = payload.prefecture {
        active.prefecture = Set(prefecture.trim().to_string());
    }
    if let Some(elevation_m) = payload.elevation_m {
        active.elevation_m = Set(elevation_m);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(photo_url) = payload.photo_url {
        active.photo_url = Set(photo_url);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("A mountain with this name already exists".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

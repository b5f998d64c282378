use axum::Json;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::models::image::{ImageMetaResponse, ImageQuery};
use crate::state::AppState;
use crate::utils::b64;
use crate::wikimedia::url as wiki_url;

/// Proxied assets are immutable by URL: once fetched, downstream caches may
/// keep them forever.
const CACHE_FOREVER: &str = "public, max-age=31536000, immutable";

/// Client identifier for rate limiting: first `X-Forwarded-For` entry when
/// running behind the edge proxy, a fixed local key otherwise.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

pub(crate) fn check_rate_limit(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    state
        .limiter
        .check(&client_key(headers))
        .map_err(|retry_after| AppError::RateLimited { retry_after })
}

fn decode_source(u: &str) -> Result<String, AppError> {
    b64::decode_url(u)
        .ok_or_else(|| AppError::Validation("u must be a base64url-encoded URL".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Images",
    operation_id = "proxyImage",
    summary = "Proxy an external image",
    description = "Fetches the image identified by the base64url-encoded `u` parameter on the server and streams its bytes back, so browsers never talk to Wikimedia directly. Wikimedia links in any recognized shape are first canonicalized to the original `upload.wikimedia.org` asset; other http(s) URLs are proxied as-is. Successful responses are cacheable indefinitely.",
    params(ImageQuery),
    responses(
        (status = 200, description = "Image bytes with the upstream content type"),
        (status = 400, description = "Undecodable or non-http(s) `u` parameter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Image unknown upstream (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Image exceeds the byte ceiling (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
        (status = 502, description = "Upstream failed after retries (UPSTREAM_FAILED)", body = ErrorBody),
        (status = 504, description = "Upstream timed out (UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, query))]
pub async fn proxy_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImageQuery>,
) -> Result<Response, AppError> {
    check_rate_limit(&state, &headers)?;
    let source = decode_source(&query.u)?;

    let target = match wiki_url::parse(&source) {
        Some(image) => state
            .commons
            .canonical_url(&image)
            .await?
            .ok_or_else(|| AppError::NotFound("Image not found on Commons".into()))?,
        // Unrecognized shapes proxy as-is, restricted to http(s).
        None => {
            let parsed = url::Url::parse(&source)
                .map_err(|_| AppError::Validation("u does not decode to a URL".into()))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Validation(
                    "Only http(s) URLs can be proxied".into(),
                ));
            }
            source
        }
    };

    let image = state.commons.fetch_image(&target).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, image.content_type)
        .header(header::CACHE_CONTROL, CACHE_FOREVER)
        .body(Body::from(image.bytes))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/meta",
    tag = "Images",
    operation_id = "imageMetadata",
    summary = "Attribution metadata for a Wikimedia image",
    description = "Returns author and license details for the Wikimedia image identified by the base64url-encoded `u` parameter. URLs that do not reference a Wikimedia-hosted file yield 404 — the absence of attribution is a normal, displayable state.",
    params(ImageQuery),
    responses(
        (status = 200, description = "Attribution metadata", body = ImageMetaResponse),
        (status = 400, description = "Undecodable `u` parameter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not a Wikimedia image or unknown file (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
        (status = 502, description = "Upstream failed after retries (UPSTREAM_FAILED)", body = ErrorBody),
        (status = 504, description = "Upstream timed out (UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, query))]
pub async fn image_meta(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ImageQuery>,
) -> Result<Json<ImageMetaResponse>, AppError> {
    check_rate_limit(&state, &headers)?;
    let source = decode_source(&query.u)?;

    let file_name = wiki_url::parse(&source)
        .and_then(|image| image.file_name())
        .ok_or_else(|| AppError::NotFound("No metadata available for this URL".into()))?;

    let meta = state
        .commons
        .file_metadata(&file_name)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found on Commons".into()))?;

    Ok(Json(meta.into()))
}

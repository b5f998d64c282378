use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::EntityTrait;

use crate::entity::user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Tokens are issued by the identity platform; this server only verifies
/// them. Add this as a handler parameter to require authentication; admin
/// checks happen via `require_admin()` in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    /// Role claim carried in the token's app metadata.
    pub role: String,
}

impl AuthUser {
    /// Admin authorization across three independent sources, any of which
    /// grants access: the configured e-mail allow-list, the token's role
    /// claim, and the user row's role column. Checked cheapest-first; the
    /// row lookup only runs when the other two miss.
    pub async fn require_admin(&self, state: &AppState) -> Result<(), AppError> {
        if state
            .config
            .auth
            .admin_emails
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&self.email))
        {
            return Ok(());
        }

        if self.role == user::ADMIN_ROLE {
            return Ok(());
        }

        let stored = user::Entity::find_by_id(self.user_id)
            .one(&state.db)
            .await?;
        if stored.is_some_and(|u| u.role == user::ADMIN_ROLE) {
            return Ok(());
        }

        Err(AppError::PermissionDenied)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            email: claims.sub,
            role: claims.role,
        })
    }
}

// crates/backend-lib/src/middleware/auth.rs

//! Bearer-token extraction.
use crate::error::AppError;
use crate::models::User;
use crate::storage::Storage;
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use std::sync::Arc;

/// The authenticated user behind a bearer access token.
///
/// Extracting this from a request verifies the token signature and
/// expiry, then re-resolves the user so deactivated or deleted accounts
/// lose access immediately.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: Storage + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = state
            .issuer
            .decode_access(token)
            .map_err(|_| AppError::Unauthorized)?;

        let user = state
            .storage
            .user_by_id(claims.sub)
            .await
            .map_err(|_| AppError::Unauthorized)?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser(user))
    }
}

// ============================
// crates/backend-lib/src/handlers/users.rs
// ============================
//! Administrative user management.
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::storage::Storage;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

/// `DELETE /api/auth/users/{email}/` - admin-only account removal
pub async fn delete_user<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(current): AuthUser,
    Path(email): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if !current.is_admin {
        return Err(AppError::PermissionDenied);
    }

    if state.storage.delete_user_by_email(&email).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("no user with email {email}")))
    }
}

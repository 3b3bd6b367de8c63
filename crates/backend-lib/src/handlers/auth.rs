// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Authentication endpoints.
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::storage::Storage;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use songa_common::{
    ChangePasswordRequest, DetailResponse, LoginRequest, LogoutRequest, MessageResponse,
    PasswordResetConfirmRequest, PasswordResetRequest, RefreshRequest, RegisterRequest, TokenPair,
};
use std::sync::Arc;

fn required(field: Option<String>, message: &str) -> Result<String, AppError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::InvalidInput(message.to_string())),
    }
}

/// `POST /api/auth/token/` - plain email login
pub async fn token<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let email = required(body.email, "email is required")?;
    let password = required(body.password, "password is required")?;
    let pair = state.auth.obtain_pair(&email, &password).await?;
    Ok(Json(pair))
}

/// `POST /api/auth/token/refresh/`
pub async fn token_refresh<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let refresh = body.refresh.filter(|t| !t.trim().is_empty());
    let refresh = refresh.ok_or(AppError::MissingToken)?;
    let pair = state.auth.refresh(&refresh).await?;
    Ok(Json(pair))
}

/// `POST /api/auth/register/`
pub async fn register<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    state.auth.register(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// `POST /api/auth/login/` - email or phone login with custom claims
pub async fn login<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let identifier = required(body.email, "email is required")?;
    let password = required(body.password, "password is required")?;
    let pair = state.auth.login(&identifier, &password).await?;
    Ok(Json(pair))
}

/// `POST /api/auth/password-reset/`
pub async fn password_reset<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let email = required(body.email, "Email is required")?;
    state.auth.request_reset(&email).await?;
    // Identical body whether or not the account exists.
    Ok(Json(MessageResponse {
        message: "If an account exists, a password reset link will be sent.".to_string(),
    }))
}

/// `POST /api/auth/password-reset-confirm/{uid}/{token}/`
pub async fn password_reset_confirm<S>(
    State(state): State<Arc<AppState<S>>>,
    Path((uid, token)): Path<(String, String)>,
    Json(body): Json<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let password1 = required(body.password1, "password1 is required")?;
    let password2 = required(body.password2, "password2 is required")?;
    state
        .auth
        .confirm_reset(&uid, &token, &password1, &password2)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successful".to_string(),
    }))
}

/// `POST /api/auth/password-reset-auth-user/` - change password while
/// logged in
pub async fn change_password<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let current = required(body.current_password, "current_password is required")?;
    let new_password = required(body.new_password, "new_password is required")?;
    let confirm = required(
        body.confirm_new_password,
        "confirm_new_password is required",
    )?;
    state
        .auth
        .change_password(&user, &current, &new_password, &confirm)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully.".to_string(),
    }))
}

/// `POST /api/auth/logout/`
pub async fn logout<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<DetailResponse>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let refresh = body.refresh_token.ok_or(AppError::MissingToken)?;
    state.auth.logout(&refresh).await?;
    Ok(Json(DetailResponse {
        detail: "Successfully logged out.".to_string(),
    }))
}

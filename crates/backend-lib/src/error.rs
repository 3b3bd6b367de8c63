// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password does not meet the policy")]
    PolicyViolation(Vec<String>),

    #[error("New passwords do not match")]
    PasswordMismatch,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,

    // Deliberately uniform: bad password and unknown identifier are
    // indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No active account found with the given credentials")]
    Unauthorized,

    // Covers malformed, expired, denylisted and fingerprint-mismatched
    // tokens alike; the distinction is never surfaced.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Refresh token is required")]
    MissingToken,

    #[error("Invalid user or token")]
    InvalidUserOrToken,

    #[error("User not found.")]
    UserNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::PolicyViolation(_)
            | AppError::PasswordMismatch
            | AppError::WrongCurrentPassword
            | AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::MissingToken
            | AppError::InvalidUserOrToken
            | AppError::UserNotFound
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "VAL_001",
            AppError::PolicyViolation(_) => "VAL_002",
            AppError::PasswordMismatch => "VAL_003",
            AppError::WrongCurrentPassword => "AUTH_004",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthorized => "AUTH_002",
            AppError::InvalidToken => "AUTH_003",
            AppError::MissingToken => "AUTH_005",
            AppError::InvalidUserOrToken => "AUTH_006",
            AppError::UserNotFound => "AUTH_007",
            AppError::PermissionDenied => "PERM_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Conflict(_) => "ST_001",
            AppError::RateLimitExceeded => "RATE_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::Io(_) => "Internal server error".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.sanitized_message();

        // Create a JSON response with error details
        let body = match &self {
            AppError::PolicyViolation(reasons) => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "details": reasons,
                }
            }),
            _ => serde_json::json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

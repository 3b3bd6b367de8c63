// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
use crate::error::AppError;
use crate::models::User;
use async_trait::async_trait;
use songa_common::{RegisterRequest, TokenPair};

/// The authentication and credential-lifecycle operations.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a new account. Email and phone are required; password is not.
    async fn register(&self, request: RegisterRequest) -> Result<User, AppError>;

    /// Email + password login for the plain token endpoint; failures are
    /// reported as `Unauthorized`.
    async fn obtain_pair(&self, email: &str, password: &str) -> Result<TokenPair, AppError>;

    /// Login with an email or phone identifier; every failure collapses
    /// to `InvalidCredentials`.
    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AppError>;

    /// Exchange a refresh token for a fresh pair, rotating when configured.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError>;

    /// Change an authenticated user's password.
    async fn change_password(
        &self,
        user: &User,
        current: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AppError>;

    /// Start a password reset. Succeeds whether or not the email exists.
    async fn request_reset(&self, email: &str) -> Result<(), AppError>;

    /// Complete a password reset from the emailed uid/token pair.
    async fn confirm_reset(
        &self,
        uid_b64: &str,
        token: &str,
        password1: &str,
        password2: &str,
    ) -> Result<(), AppError>;

    /// Invalidate a presented refresh token.
    async fn logout(&self, refresh_token: &str) -> Result<(), AppError>;

    /// Bootstrap an admin account.
    async fn create_superuser(
        &self,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<User, AppError>;
}

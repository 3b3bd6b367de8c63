// ============================
// crates/backend-lib/src/auth/service_impl.rs
// ============================
//! Default implementation of the [`AuthService`] trait.
use crate::auth::claims::RefreshClaims;
use crate::auth::jwt::{TokenDenylist, TokenIssuer};
use crate::auth::password::{hash_password, validate_password_policy, verify_password};
use crate::auth::reset::ResetTokenGenerator;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::email::{templates, Mailer};
use crate::error::AppError;
use crate::models::User;
use crate::storage::Storage;
use crate::validation::{is_valid_e164, is_valid_email, normalize_identifier, Identifier};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use metrics::counter;
use songa_common::{RegisterRequest, Role, TokenPair};
use std::sync::Arc;
use uuid::Uuid;

/// Base64url encoding of a user id, as embedded in reset deep links
pub fn encode_uid(id: Uuid) -> String {
    URL_SAFE_NO_PAD.encode(id.to_string())
}

fn decode_uid(uid_b64: &str) -> Result<Uuid, AppError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(uid_b64)
        .map_err(|_| AppError::InvalidUserOrToken)?;
    let text = String::from_utf8(bytes).map_err(|_| AppError::InvalidUserOrToken)?;
    Uuid::parse_str(&text).map_err(|_| AppError::InvalidUserOrToken)
}

pub struct DefaultAuth<S> {
    storage: S,
    issuer: Arc<TokenIssuer>,
    denylist: TokenDenylist,
    reset_tokens: ResetTokenGenerator,
    mailer: Arc<dyn Mailer>,
    reset_link_base: String,
}

impl<S: Storage> DefaultAuth<S> {
    pub fn new(
        storage: S,
        issuer: Arc<TokenIssuer>,
        denylist: TokenDenylist,
        mailer: Arc<dyn Mailer>,
        settings: &Settings,
    ) -> Self {
        Self {
            storage,
            issuer,
            denylist,
            reset_tokens: ResetTokenGenerator::new(
                &settings.jwt.secret,
                settings.reset.token_ttl_secs,
            ),
            mailer,
            reset_link_base: settings.reset.link_base.clone(),
        }
    }

    /// Credential check + pair issuance shared by the login paths.
    /// Unknown email, inactive account, missing hash and wrong password
    /// all produce the same error.
    async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self
            .storage
            .user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(hash, password) {
            return Err(AppError::InvalidCredentials);
        }

        self.issuer.issue_pair(&user)
    }

    async fn set_password(&self, user: &User, plain: &str) -> Result<(), AppError> {
        let mut updated = user.clone();
        updated.password_hash =
            Some(hash_password(plain).map_err(|e| AppError::Internal(e.to_string()))?);
        updated.updated_at = Utc::now();
        self.storage.update_user(&updated).await
    }

    fn denylist_if_enabled(&self, claims: &RefreshClaims) {
        if self.issuer.blacklist_after_rotation {
            self.denylist.insert(claims.jti, claims.exp);
        }
    }
}

#[async_trait]
impl<S: Storage> AuthService for DefaultAuth<S> {
    async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return Err(AppError::InvalidInput(
                "Email address must be provided".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AppError::InvalidInput(
                "Enter a valid email address".to_string(),
            ));
        }

        let phone = request.phone.as_deref().map(str::trim).unwrap_or_default();
        if phone.is_empty() {
            return Err(AppError::InvalidInput(
                "Phone number must be provided".to_string(),
            ));
        }
        // Registration expects the client to supply E.164 already; only
        // the login path normalizes.
        if !is_valid_e164(phone) {
            return Err(AppError::InvalidInput(
                "Enter a valid phone number".to_string(),
            ));
        }

        let password_hash = match request.password.as_deref() {
            Some(plain) if !plain.is_empty() => {
                Some(hash_password(plain).map_err(|e| AppError::Internal(e.to_string()))?)
            },
            _ => None,
        };

        let role = request.role.unwrap_or_default();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            phone: phone.to_string(),
            first_name: request.first_name.unwrap_or_default(),
            middle_name: request.middle_name,
            last_name: request.last_name.unwrap_or_default(),
            username: request.username,
            passport_or_id: request.passport_or_id,
            business_name: request.business_name,
            password_hash,
            role,
            license_status: request.license_status.unwrap_or_default(),
            is_admin: role == Role::Admin,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };

        self.storage.create_user(&user).await?;
        counter!("auth.registered", 1);
        Ok(user)
    }

    async fn obtain_pair(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        self.authenticate(email, password)
            .await
            .map_err(|e| match e {
                AppError::InvalidCredentials => AppError::Unauthorized,
                other => other,
            })
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AppError> {
        let email = match normalize_identifier(identifier)
            .map_err(|_| AppError::InvalidCredentials)?
        {
            Identifier::Email(email) => email,
            Identifier::Phone(phone) => self
                .storage
                .user_by_phone(&phone)
                .await?
                .ok_or(AppError::InvalidCredentials)?
                .email,
        };

        let pair = self.authenticate(&email, password).await?;
        counter!("auth.login", 1);
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.issuer.decode_refresh(refresh_token)?;

        if self.issuer.blacklist_after_rotation && self.denylist.contains(&claims.jti) {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .storage
            .user_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let refresh = if self.issuer.rotate_refresh_tokens {
            self.denylist_if_enabled(&claims);
            let (token, _) = self.issuer.issue_refresh(&user)?;
            token
        } else {
            refresh_token.to_string()
        };

        // Claims are rebuilt from the user's current field values, never
        // copied from the presented token.
        let access = self.issuer.issue_access(&user)?;
        counter!("auth.refreshed", 1);
        Ok(TokenPair { access, refresh })
    }

    async fn change_password(
        &self,
        user: &User,
        current: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), AppError> {
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::WrongCurrentPassword)?;
        if !verify_password(hash, current) {
            return Err(AppError::WrongCurrentPassword);
        }
        if new_password != confirm {
            return Err(AppError::PasswordMismatch);
        }
        validate_password_policy(new_password).map_err(AppError::PolicyViolation)?;

        self.set_password(user, new_password).await?;
        counter!("auth.password_changed", 1);
        Ok(())
    }

    async fn request_reset(&self, email: &str) -> Result<(), AppError> {
        let Some(user) = self.storage.user_by_email(email).await? else {
            // Same response either way; no email goes out.
            return Ok(());
        };

        let token = self.reset_tokens.make_token(&user);
        let uid = encode_uid(user.id);
        let reset_url = format!("{}?uid={uid}&token={token}", self.reset_link_base);

        let html = templates::password_reset_html(&user, &reset_url);
        let text = templates::password_reset_text(&user, &reset_url);
        match self
            .mailer
            .send(&user.email, templates::PASSWORD_RESET_SUBJECT, &html, &text)
            .await
        {
            Ok(()) => counter!("email.reset_sent", 1),
            Err(e) => {
                // Delivery failures must not reveal whether the account
                // exists; the generic success still goes out.
                tracing::warn!(error = %e, "failed to send password reset email");
                counter!("email.reset_failed", 1);
            },
        }
        Ok(())
    }

    async fn confirm_reset(
        &self,
        uid_b64: &str,
        token: &str,
        password1: &str,
        password2: &str,
    ) -> Result<(), AppError> {
        let id = decode_uid(uid_b64)?;
        let user = self
            .storage
            .user_by_id(id)
            .await?
            .ok_or(AppError::InvalidUserOrToken)?;

        if !self.reset_tokens.check_token(&user, token) {
            return Err(AppError::InvalidToken);
        }

        if password1 != password2 {
            return Err(AppError::PasswordMismatch);
        }
        validate_password_policy(password1).map_err(AppError::PolicyViolation)?;

        self.set_password(&user, password1).await?;
        counter!("auth.password_reset", 1);
        Ok(())
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        if refresh_token.trim().is_empty() {
            return Err(AppError::MissingToken);
        }
        let claims = self.issuer.decode_refresh(refresh_token)?;
        // Server side this is advisory: nothing beyond the denylist holds
        // session state.
        self.denylist_if_enabled(&claims);
        counter!("auth.logout", 1);
        Ok(())
    }

    async fn create_superuser(
        &self,
        email: &str,
        phone: &str,
        password: &str,
    ) -> Result<User, AppError> {
        self.register(RegisterRequest {
            email: Some(email.to_string()),
            phone: Some(phone.to_string()),
            role: Some(Role::Admin),
            password: Some(password.to_string()),
            ..RegisterRequest::default()
        })
        .await
    }
}

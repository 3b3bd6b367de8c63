// ============================
// crates/backend-lib/src/auth/jwt.rs
// ============================
//! Signed access/refresh token issuance and verification.
use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::config::JwtSettings;
use crate::error::AppError;
use crate::models::User;
use chrono::Utc;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use metrics::counter;
use songa_common::TokenPair;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Issues and verifies the signed token pair.
///
/// Signature and expiry are the sole validity checks; everything else a
/// downstream caller wants to know rides inside the claims.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    pub rotate_refresh_tokens: bool,
    pub blacklist_after_rotation: bool,
}

impl TokenIssuer {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_ttl_secs: settings.access_ttl_secs,
            refresh_ttl_secs: settings.refresh_ttl_secs,
            rotate_refresh_tokens: settings.rotate_refresh_tokens,
            blacklist_after_rotation: settings.blacklist_after_rotation,
        }
    }

    /// Sign an access token carrying the user's current claim set
    pub fn issue_access(&self, user: &User) -> Result<String, AppError> {
        let claims = AccessClaims::for_user(user, self.access_ttl_secs);
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Sign a refresh token; returns the claims so the caller can track the jti
    pub fn issue_refresh(&self, user: &User) -> Result<(String, RefreshClaims), AppError> {
        let claims = RefreshClaims::for_user(user, self.refresh_ttl_secs);
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok((token, claims))
    }

    /// Issue a fresh access/refresh pair for a user
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        let access = self.issue_access(user)?;
        let (refresh, _) = self.issue_refresh(user)?;
        Ok(TokenPair { access, refresh })
    }

    /// Verify an access token's signature and expiry
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        decode::<AccessClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Verify a refresh token's signature and expiry
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        decode::<RefreshClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

/// In-memory denylist of rotated/blacklisted refresh token ids.
///
/// Entries expire with the token they refer to; a periodic sweep drops
/// the stale ones so the map stays bounded by the refresh TTL.
#[derive(Clone)]
pub struct TokenDenylist {
    entries: Arc<DashMap<Uuid, i64>>,
}

impl TokenDenylist {
    /// Create a new denylist and spawn its cleanup task
    pub fn new() -> Self {
        let denylist = TokenDenylist {
            entries: Arc::new(DashMap::new()),
        };

        let denylist_clone = denylist.clone();
        tokio::spawn(async move {
            denylist_clone.cleanup_task().await;
        });

        denylist
    }

    /// Deny a refresh token id until its own expiry
    pub fn insert(&self, jti: Uuid, exp: i64) {
        self.entries.insert(jti, exp);
        counter!("token.denylisted", 1);
    }

    /// Whether a token id has been denylisted
    pub fn contains(&self, jti: &Uuid) -> bool {
        self.entries.contains_key(jti)
    }

    /// Cleanup task that runs periodically to drop expired entries
    async fn cleanup_task(&self) {
        let cleanup_interval = Duration::from_secs(60 * 60); // 1 hour

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let now = Utc::now().timestamp();
            let before_count = self.entries.len();
            self.entries.retain(|_, exp| *exp > now);
            let removed = before_count - self.entries.len();

            if removed > 0 {
                counter!("token.denylist_swept", removed as u64);
            }
        }
    }
}

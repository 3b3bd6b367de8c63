// ============================
// crates/backend-lib/src/auth/claims.rs
// ============================
//! Typed claim sets embedded in signed tokens.
//!
//! The claim set is a fixed struct so the login and refresh paths cannot
//! drift apart. Optional profile fields are carried as empty strings,
//! matching what API clients already expect.

use crate::models::User;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use songa_common::Role;
use uuid::Uuid;

/// Claims embedded in an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - user id
    pub sub: Uuid,
    pub phone: String,
    pub email: String,
    pub business_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub username: String,
    pub license_status: String,
    pub role: Role,
    pub is_verified: bool,
    /// Expiry (unix timestamp)
    pub exp: i64,
    /// Issued at (unix timestamp)
    pub iat: i64,
}

impl AccessClaims {
    /// Build a fresh claim set from the user's current field values
    pub fn for_user(user: &User, ttl_secs: u64) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: user.id,
            phone: user.phone.clone(),
            email: user.email.clone(),
            business_name: user.business_name.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            middle_name: user.middle_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone(),
            username: user.username.clone().unwrap_or_default(),
            license_status: user.license_status.to_string(),
            role: user.role,
            is_verified: user.is_verified,
            exp: iat + ttl_secs as i64,
            iat,
        }
    }
}

/// Claims embedded in a refresh token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - user id
    pub sub: Uuid,
    /// Rotation id, used for denylisting
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl RefreshClaims {
    pub fn for_user(user: &User, ttl_secs: u64) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: user.id,
            jti: Uuid::new_v4(),
            exp: iat + ttl_secs as i64,
            iat,
        }
    }
}

// ============================
// crates/backend-lib/src/auth/reset.rs
// ============================
//! Single-use, time-boxed password reset tokens.
//!
//! A token is `"<issue-ts>-<mac>"` followed by a 10-digit expiry
//! timestamp. The MAC covers the user's id, the issue timestamp, the
//! `is_active` flag and the current password hash, so flipping the flag
//! or completing a reset invalidates every outstanding token. Callers
//! only ever learn valid/invalid; expired, malformed and mismatched
//! tokens are indistinguishable.

use crate::models::User;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Number of trailing characters holding the expiry timestamp
const EXPIRY_SUFFIX_LEN: usize = 10;

/// Generates and verifies password reset tokens
pub struct ResetTokenGenerator {
    key: Vec<u8>,
    ttl_secs: u64,
}

impl ResetTokenGenerator {
    pub fn new(key: &str, ttl_secs: u64) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
            ttl_secs,
        }
    }

    fn fingerprint(user: &User, timestamp: i64) -> String {
        format!(
            "{}|{}|{}|{}",
            user.id,
            timestamp,
            user.is_active,
            user.password_hash.as_deref().unwrap_or_default()
        )
    }

    fn mac(&self, payload: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("hmac accepts any key length");
        mac.update(payload.as_bytes());
        mac
    }

    /// Produce a token for the user, expiring after the configured TTL
    pub fn make_token(&self, user: &User) -> String {
        let issued_at = Utc::now().timestamp();
        let expires_at = issued_at + self.ttl_secs as i64;
        let tag = self.mac(&Self::fingerprint(user, issued_at)).finalize();
        let encoded = URL_SAFE_NO_PAD.encode(tag.into_bytes());
        format!("{issued_at}-{encoded}{expires_at:010}")
    }

    /// Check a token against the user's current state
    pub fn check_token(&self, user: &User, token: &str) -> bool {
        if !token.is_ascii() || token.len() <= EXPIRY_SUFFIX_LEN {
            return false;
        }
        let (base, suffix) = token.split_at(token.len() - EXPIRY_SUFFIX_LEN);

        let expires_at: i64 = match suffix.parse() {
            Ok(ts) => ts,
            Err(_) => return false,
        };
        if expires_at < Utc::now().timestamp() {
            return false;
        }

        let Some((issued_str, encoded)) = base.split_once('-') else {
            return false;
        };
        let issued_at: i64 = match issued_str.parse() {
            Ok(ts) => ts,
            Err(_) => return false,
        };
        let tag = match URL_SAFE_NO_PAD.decode(encoded) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        self.mac(&Self::fingerprint(user, issued_at))
            .verify_slice(&tag)
            .is_ok()
    }
}

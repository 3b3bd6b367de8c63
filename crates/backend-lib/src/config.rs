// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Signed-token settings
    pub jwt: JwtSettings,
    /// Password-reset settings
    pub reset: ResetSettings,
    /// Rate limit settings
    pub rate_limit: RateLimitSettings,
    /// Outbound SMTP settings; `None` disables real delivery
    pub smtp: Option<SmtpSettings>,
    /// Bootstrap superuser, created at startup when absent
    pub superuser: Option<SuperuserSettings>,
}

/// JWT signing key, lifetimes and rotation policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtSettings {
    /// HS256 signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: u64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: u64,
    /// Issue a new refresh token on every refresh
    pub rotate_refresh_tokens: bool,
    /// Denylist the presented refresh token after rotation
    pub blacklist_after_rotation: bool,
}

/// Password-reset token settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResetSettings {
    /// Reset token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Deep-link base the uid/token query is appended to
    pub link_base: String,
}

/// Rate limit settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Maximum requests per window per client
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

/// SMTP relay credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    /// SMTP server hostname (e.g. smtp.gmail.com)
    pub host: String,
    /// SMTP server port (typically 587 for TLS)
    pub port: u16,
    /// The email address/username for SMTP authentication
    pub username: String,
    /// The password or app-specific password for SMTP
    pub password: String,
    /// From address on outbound mail
    pub from: String,
}

/// Bootstrap superuser credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SuperuserSettings {
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("valid default addr"),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            jwt: JwtSettings::default(),
            reset: ResetSettings::default(),
            rate_limit: RateLimitSettings::default(),
            smtp: None,
            superuser: None,
        }
    }
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: "change-me".to_string(),
            access_ttl_secs: 300,              // 5 minutes
            refresh_ttl_secs: 60 * 60 * 24 * 7, // 7 days
            rotate_refresh_tokens: true,
            blacklist_after_rotation: true,
        }
    }
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: 60 * 60, // 1 hour
            link_base: "songaai://reset-password/".to_string(),
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 60,
        }
    }
}

impl Settings {
    /// Load settings from various sources
    pub fn load() -> Result<Self> {
        // Try to load from config file first, then environment variables
        let settings = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("SONGA_").split("__"))
            .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit TOML file path
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("SONGA_").split("__"))
            .extract()?;

        Ok(settings)
    }
}

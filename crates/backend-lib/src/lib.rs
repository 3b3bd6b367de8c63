// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the songa e-commerce server.

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod storage;
pub mod validation;

use crate::auth::{AuthService, DefaultAuth, TokenDenylist, TokenIssuer};
use crate::config::Settings;
use crate::email::Mailer;
use crate::middleware::rate_limit::RateLimitEntry;
use crate::storage::Storage;
use dashmap::DashMap;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Token issuer, shared with the bearer extractor
    pub issuer: Arc<TokenIssuer>,
    /// Settings manager
    pub settings: Arc<Settings>,
    /// Storage backend
    pub storage: S,
    /// Rate limit windows keyed by client
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl<S> AppState<S>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    /// Create a new application state
    pub fn new(storage: S, settings: Settings, mailer: Arc<dyn Mailer>) -> Self {
        let settings = Arc::new(settings);
        let issuer = Arc::new(TokenIssuer::new(&settings.jwt));
        let denylist = TokenDenylist::new();
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            Arc::clone(&issuer),
            denylist,
            mailer,
            &settings,
        ));

        Self {
            auth,
            issuer,
            settings,
            storage,
            rate_limits: Arc::new(DashMap::new()),
        }
    }
}

// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the songa backend.

pub mod auth;
pub mod rate_limit;

pub use auth::AuthUser;
pub use rate_limit::rate_limit;

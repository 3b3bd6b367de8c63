// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! shared between the songa backend and its API clients.
//! This module defines the JSON request/response bodies and supporting enums.

use serde::{Deserialize, Serialize};

/// User role
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    Admin,
    #[default]
    Client,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Client => write!(f, "Client"),
        }
    }
}

/// License status (available or not)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LicenseStatus {
    Yes,
    #[default]
    No,
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseStatus::Yes => write!(f, "Yes"),
            LicenseStatus::No => write!(f, "No"),
        }
    }
}

/// Order lifecycle status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Canceled,
}

/// Body for `POST /api/auth/register/`
///
/// All fields are optional at the wire level; the service reports which
/// required ones are missing or blank.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    /// Phone number, already in E.164 form
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub business_name: Option<String>,
    pub passport_or_id: Option<String>,
    pub license_status: Option<LicenseStatus>,
    pub role: Option<Role>,
    /// Optional: accounts may be created without a password
    pub password: Option<String>,
}

/// Body for `POST /api/auth/token/` and `POST /api/auth/login/`
/// # Fields
/// * `email` - the login identifier; on `/login/` this may also be a phone number
/// * `password` - plaintext password
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Access/refresh pair returned by the token, login and refresh endpoints
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body for `POST /api/auth/token/refresh/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Body for `POST /api/auth/password-reset-auth-user/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

/// Body for `POST /api/auth/password-reset/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordResetRequest {
    pub email: Option<String>,
}

/// Body for `POST /api/auth/password-reset-confirm/{uid}/{token}/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordResetConfirmRequest {
    pub password1: Option<String>,
    pub password2: Option<String>,
}

/// Body for `POST /api/auth/logout/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Generic `{"message": ...}` response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

/// Generic `{"detail": ...}` response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DetailResponse {
    pub detail: String,
}

/// Body for `POST /api/products/` and `PUT /api/products/{id}/`
/// # Fields
/// * `price` - decimal amount as a string, e.g. `"10.00"`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock_quantity: Option<u32>,
}

/// One line of an order as submitted by the client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderItemPayload {
    pub product_id: uuid::Uuid,
    pub quantity: u32,
    pub price_at_time_of_order: String,
}

/// Body for `POST /api/orders/` and `PUT /api/orders/{id}/`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OrderPayload {
    pub products: Option<Vec<OrderItemPayload>>,
    pub total_price: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Body for `POST /api/cart/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CartAddRequest {
    pub product_id: Option<uuid::Uuid>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Body for `PUT /api/cart-item/update/{id}/`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CartQuantityRequest {
    pub quantity: Option<u32>,
}

// ============================
// crates/backend-lib/src/models.rs
// ============================
//! Stored domain records. Wire bodies live in `songa-common`; these are
//! the shapes the storage layer persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use songa_common::{LicenseStatus, OrderStatus, Role};
use uuid::Uuid;

/// A user of the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique, primary lookup key
    pub email: String,
    /// Unique, E.164
    pub phone: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub username: Option<String>,
    pub passport_or_id: Option<String>,
    pub business_name: Option<String>,
    /// scrypt PHC string; `None` = passwordless placeholder account
    pub password_hash: Option<String>,
    pub role: Role,
    pub license_status: LicenseStatus,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_staff(&self) -> bool {
        self.is_admin
    }
}

/// A product the seller (admin) uploads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub seller: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal amount as a string, e.g. `"10.00"`
    pub price: String,
    pub stock_quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line inside an order, with the price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub price_at_time_of_order: String,
}

/// A customer order, linking a client to the products purchased
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub client: Uuid,
    pub products: Vec<OrderItem>,
    pub total_price: String,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
}

/// One product line in a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

/// A client's cart; one per client, created on first access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub client: Uuid,
    pub items: Vec<CartItem>,
}

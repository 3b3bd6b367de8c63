// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
//!
//! Records are stored one JSON file per record under the data directory.
//! Email/phone lookups scan the users directory; uniqueness violations
//! surface as `AppError::Conflict`.
use crate::error::AppError;
use crate::models::{Cart, Order, Product, User};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::fs as tokio_fs;
use uuid::Uuid;

/// Trait for storage backends
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist a new user; email and phone must be unique
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    /// Look up a user by id
    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Look up a user by email
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Look up a user by E.164 phone
    async fn user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Overwrite an existing user record
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    /// Delete a user by email; returns whether a record existed
    async fn delete_user_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Insert or overwrite a product
    async fn put_product(&self, product: &Product) -> Result<(), AppError>;

    /// Look up a product by id
    async fn product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// List all products
    async fn products(&self) -> Result<Vec<Product>, AppError>;

    /// Delete a product by id; returns whether a record existed
    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError>;

    /// Insert or overwrite an order
    async fn put_order(&self, order: &Order) -> Result<(), AppError>;

    /// Look up an order by id
    async fn order(&self, id: Uuid) -> Result<Option<Order>, AppError>;

    /// List the orders placed by a client
    async fn orders_by_client(&self, client: Uuid) -> Result<Vec<Order>, AppError>;

    /// Delete an order by id; returns whether a record existed
    async fn delete_order(&self, id: Uuid) -> Result<bool, AppError>;

    /// Look up a client's cart
    async fn cart(&self, client: Uuid) -> Result<Option<Cart>, AppError>;

    /// Insert or overwrite a client's cart
    async fn put_cart(&self, cart: &Cart) -> Result<(), AppError>;
}

/// Flat-file implementation of the Storage trait
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        fs::create_dir_all(root.join("products"))?;
        fs::create_dir_all(root.join("orders"))?;
        fs::create_dir_all(root.join("carts"))?;
        Ok(Self { root })
    }

    fn record_path(&self, dir: &str, key: &str) -> PathBuf {
        self.root.join(dir).join(format!("{key}.json"))
    }

    async fn write_record<T: Serialize>(&self, dir: &str, key: &str, record: &T) -> Result<(), AppError> {
        let path = self.record_path(dir, key);
        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(path, json).await?;
        Ok(())
    }

    async fn read_record<T: DeserializeOwned>(&self, dir: &str, key: &str) -> Result<Option<T>, AppError> {
        let path = self.record_path(dir, key);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn read_all<T: DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>, AppError> {
        let mut records = Vec::new();
        let mut entries = tokio_fs::read_dir(self.root.join(dir)).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = tokio_fs::read_to_string(&path).await?;
                records.push(serde_json::from_str(&content)?);
            }
        }
        Ok(records)
    }

    async fn delete_record(&self, dir: &str, key: &str) -> Result<bool, AppError> {
        let path = self.record_path(dir, key);
        if !path.exists() {
            return Ok(false);
        }
        tokio_fs::remove_file(path).await?;
        Ok(true)
    }

    async fn find_user<F>(&self, pred: F) -> Result<Option<User>, AppError>
    where
        F: Fn(&User) -> bool + Send,
    {
        let users: Vec<User> = self.read_all("users").await?;
        Ok(users.into_iter().find(|u| pred(u)))
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        if self.user_by_email(&user.email).await?.is_some() {
            return Err(AppError::Conflict(
                "user with this email already exists".to_string(),
            ));
        }
        if self.user_by_phone(&user.phone).await?.is_some() {
            return Err(AppError::Conflict(
                "user with this phone already exists".to_string(),
            ));
        }
        self.write_record("users", &user.id.to_string(), user).await
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.read_record("users", &id.to_string()).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user(|u| u.email == email).await
    }

    async fn user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        self.find_user(|u| u.phone == phone).await
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        if let Some(other) = self.user_by_email(&user.email).await? {
            if other.id != user.id {
                return Err(AppError::Conflict(
                    "user with this email already exists".to_string(),
                ));
            }
        }
        if let Some(other) = self.user_by_phone(&user.phone).await? {
            if other.id != user.id {
                return Err(AppError::Conflict(
                    "user with this phone already exists".to_string(),
                ));
            }
        }
        self.write_record("users", &user.id.to_string(), user).await
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<bool, AppError> {
        match self.user_by_email(email).await? {
            Some(user) => self.delete_record("users", &user.id.to_string()).await,
            None => Ok(false),
        }
    }

    async fn put_product(&self, product: &Product) -> Result<(), AppError> {
        self.write_record("products", &product.id.to_string(), product)
            .await
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        self.read_record("products", &id.to_string()).await
    }

    async fn products(&self) -> Result<Vec<Product>, AppError> {
        let mut products: Vec<Product> = self.read_all("products").await?;
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_record("products", &id.to_string()).await
    }

    async fn put_order(&self, order: &Order) -> Result<(), AppError> {
        self.write_record("orders", &order.id.to_string(), order)
            .await
    }

    async fn order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        self.read_record("orders", &id.to_string()).await
    }

    async fn orders_by_client(&self, client: Uuid) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self.read_all("orders").await?;
        orders.retain(|o| o.client == client);
        orders.sort_by_key(|o| o.order_date);
        Ok(orders)
    }

    async fn delete_order(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_record("orders", &id.to_string()).await
    }

    async fn cart(&self, client: Uuid) -> Result<Option<Cart>, AppError> {
        self.read_record("carts", &client.to_string()).await
    }

    async fn put_cart(&self, cart: &Cart) -> Result<(), AppError> {
        self.write_record("carts", &cart.client.to_string(), cart)
            .await
    }
}

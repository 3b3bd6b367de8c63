// ============================
// crates/backend-lib/src/handlers/catalog.rs
// ============================
//! Product, order and cart CRUD.
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::{Cart, CartItem, Order, OrderItem, Product};
use crate::storage::Storage;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use songa_common::{CartAddRequest, CartQuantityRequest, OrderPayload, ProductPayload};
use std::sync::Arc;
use uuid::Uuid;

/// `GET /api/products/`
pub async fn list_products<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<Product>>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    Ok(Json(state.storage.products().await?))
}

/// `POST /api/products/` - the seller is the current user
pub async fn create_product<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(body): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("name is required".to_string()))?;
    let price = body
        .price
        .ok_or_else(|| AppError::InvalidInput("price is required".to_string()))?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4(),
        seller: user.id,
        name,
        description: body.description.unwrap_or_default(),
        price,
        stock_quantity: body.stock_quantity.unwrap_or_default(),
        created_at: now,
        updated_at: now,
    };
    state.storage.put_product(&product).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/{id}/`
pub async fn get_product<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let product = state
        .storage
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    Ok(Json(product))
}

/// `PUT /api/products/{id}/` - partial update
pub async fn update_product<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductPayload>,
) -> Result<Json<Product>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let mut product = state
        .storage
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    if let Some(name) = body.name {
        product.name = name;
    }
    if let Some(description) = body.description {
        product.description = description;
    }
    if let Some(price) = body.price {
        product.price = price;
    }
    if let Some(stock_quantity) = body.stock_quantity {
        product.stock_quantity = stock_quantity;
    }
    product.updated_at = Utc::now();

    state.storage.put_product(&product).await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}/`
pub async fn delete_product<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    if state.storage.delete_product(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("product".to_string()))
    }
}

/// `GET /api/orders/` - only the caller's own orders
pub async fn list_orders<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Order>>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    Ok(Json(state.storage.orders_by_client(user.id).await?))
}

/// `POST /api/orders/`
pub async fn create_order<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(body): Json<OrderPayload>,
) -> Result<(StatusCode, Json<Order>), AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let items = body
        .products
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::InvalidInput("products are required".to_string()))?;
    let total_price = body
        .total_price
        .ok_or_else(|| AppError::InvalidInput("total_price is required".to_string()))?;

    let order = Order {
        id: Uuid::new_v4(),
        client: user.id,
        products: items
            .into_iter()
            .map(|item| OrderItem {
                id: Uuid::new_v4(),
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_time_of_order: item.price_at_time_of_order,
            })
            .collect(),
        total_price,
        status: body.status.unwrap_or_default(),
        order_date: Utc::now(),
    };
    state.storage.put_order(&order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn owned_order<S>(
    state: &AppState<S>,
    id: Uuid,
    client: Uuid,
) -> Result<Order, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    state
        .storage
        .order(id)
        .await?
        .filter(|order| order.client == client)
        .ok_or_else(|| AppError::NotFound("order".to_string()))
}

/// `GET /api/orders/{id}/`
pub async fn get_order<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    Ok(Json(owned_order(&state, id, user.id).await?))
}

/// `PUT /api/orders/{id}/` - partial update
pub async fn update_order<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<OrderPayload>,
) -> Result<Json<Order>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let mut order = owned_order(&state, id, user.id).await?;

    if let Some(status) = body.status {
        order.status = status;
    }
    if let Some(total_price) = body.total_price {
        order.total_price = total_price;
    }

    state.storage.put_order(&order).await?;
    Ok(Json(order))
}

/// `DELETE /api/orders/{id}/`
pub async fn delete_order<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let order = owned_order(&state, id, user.id).await?;
    state.storage.delete_order(order.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/cart/` - the cart is created on first access
pub async fn get_cart<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Cart>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let cart = match state.storage.cart(user.id).await? {
        Some(cart) => cart,
        None => {
            let cart = Cart {
                client: user.id,
                items: Vec::new(),
            };
            state.storage.put_cart(&cart).await?;
            cart
        },
    };
    Ok(Json(cart))
}

/// `POST /api/cart/` - add a product; existing lines accumulate quantity
pub async fn add_to_cart<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Json(body): Json<CartAddRequest>,
) -> Result<(StatusCode, Json<Cart>), AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let product_id = body.product_id.ok_or_else(|| {
        AppError::InvalidInput("Product ID and quantity are required.".to_string())
    })?;
    if body.quantity == 0 {
        return Err(AppError::InvalidInput(
            "Product ID and quantity are required.".to_string(),
        ));
    }

    state
        .storage
        .product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

    let mut cart = state.storage.cart(user.id).await?.unwrap_or(Cart {
        client: user.id,
        items: Vec::new(),
    });

    match cart.items.iter_mut().find(|i| i.product_id == product_id) {
        Some(item) => item.quantity += body.quantity,
        None => cart.items.push(CartItem {
            id: Uuid::new_v4(),
            product_id,
            quantity: body.quantity,
        }),
    }

    state.storage.put_cart(&cart).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// `PUT /api/cart-item/update/{id}/`
pub async fn update_cart_item<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CartQuantityRequest>,
) -> Result<Json<CartItem>, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let quantity = body.quantity.unwrap_or(0);
    if quantity == 0 {
        return Err(AppError::InvalidInput(
            "Quantity must be greater than 0.".to_string(),
        ));
    }

    let mut cart = state
        .storage
        .cart(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found.".to_string()))?;

    let item = cart
        .items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| AppError::NotFound("Cart item not found.".to_string()))?;
    item.quantity = quantity;
    let updated = item.clone();

    state.storage.put_cart(&cart).await?;
    Ok(Json(updated))
}

/// `DELETE /api/cart-item/delete/{id}/`
pub async fn delete_cart_item<S>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError>
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let mut cart = state
        .storage
        .cart(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found.".to_string()))?;

    let before = cart.items.len();
    cart.items.retain(|i| i.id != id);
    if cart.items.len() == before {
        return Err(AppError::NotFound("Cart item not found.".to_string()));
    }

    state.storage.put_cart(&cart).await?;
    Ok(StatusCode::NO_CONTENT)
}

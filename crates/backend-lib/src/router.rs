// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router assembly.
use crate::handlers::{auth, catalog, users};
use crate::middleware::rate_limit;
use crate::storage::Storage;
use crate::AppState;
use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router
pub fn create_router<S>(state: Arc<AppState<S>>) -> Router
where
    S: Storage + Clone + Send + Sync + 'static,
{
    let auth_routes = Router::new()
        .route("/token/", post(auth::token))
        .route("/token/refresh/", post(auth::token_refresh))
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/password-reset/", post(auth::password_reset))
        .route(
            "/password-reset-confirm/{uid}/{token}/",
            post(auth::password_reset_confirm),
        )
        .route("/password-reset-auth-user/", post(auth::change_password))
        .route("/logout/", post(auth::logout))
        .route("/users/{email}/", delete(users::delete_user));

    let catalog_routes = Router::new()
        .route(
            "/products/",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/products/{id}/",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route(
            "/orders/",
            get(catalog::list_orders).post(catalog::create_order),
        )
        .route(
            "/orders/{id}/",
            get(catalog::get_order)
                .put(catalog::update_order)
                .delete(catalog::delete_order),
        )
        .route("/cart/", get(catalog::get_cart).post(catalog::add_to_cart))
        .route("/cart-item/update/{id}/", put(catalog::update_cart_item))
        .route(
            "/cart-item/delete/{id}/",
            delete(catalog::delete_cart_item),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", catalog_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit::<S>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

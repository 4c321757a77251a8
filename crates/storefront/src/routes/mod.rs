//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Catalog
//! GET  /products               - Product listing (?category=<id>)
//! GET  /products/{id}          - Product detail
//!
//! # Cart
//! POST /cart                   - Resolve a client cart against the catalog
//!
//! # Checkout and payment
//! POST /checkout               - Create a hosted checkout session
//! POST /webhook                - Payment gateway webhook (signed)
//!
//! # Orders (require auth unless noted)
//! GET  /orders                 - Current user's order history
//! GET  /orders/{id}            - Order detail (no auth; confirmation page)
//! GET  /shipping               - Latest order's contact/address details
//!
//! # Google OAuth
//! GET  /auth/google/login      - Redirect to Google consent screen
//! GET  /auth/google/callback   - Handle OAuth callback
//! POST /auth/logout            - Clear the session
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google/login", get(auth::login))
        .route("/google/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout::create))
        .route("/webhook", post(webhook::receive))
        .route("/cart", post(cart::resolve))
        .route("/shipping", get(orders::shipping))
        .nest("/orders", order_routes())
        .nest("/products", product_routes())
        .nest("/auth", auth_routes())
}

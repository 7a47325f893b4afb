//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate-limited)
//! POST /auth/register          - Create an account
//! POST /auth/login             - Login, returns a bearer token
//!
//! # Catalog
//! GET  /products               - Public listing (active + verified)
//! GET  /products/{id}          - Single listing
//! POST /products               - Create a listing (seller)
//! GET  /products/mine          - Seller's own listings, any state
//!
//! # Cart (buyer; scoped by token identity)
//! GET    /cart                 - Cart contents
//! POST   /cart                 - Add to cart (merges repeat adds)
//! PUT    /cart/{product_id}    - Replace a line's quantity
//! DELETE /cart/{product_id}    - Remove a line
//!
//! # Orders
//! POST /orders                 - Checkout (buyer)
//! GET  /orders                 - Own order history (buyer)
//!
//! # Reference data
//! GET  /categories             - Static category list
//!
//! # Admin
//! GET  /admin/orders                     - Full order ledger
//! POST /admin/orders/{id}/status         - Advance an order's status
//! GET  /admin/products/pending           - Moderation queue
//! POST /admin/products/{id}/verify       - Approve a listing
//! POST /admin/products/{id}/reject       - Reject a listing with a reason
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router, with its own rate limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/mine", get(products::mine))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route(
            "/{product_id}",
            axum::routing::put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::history).post(orders::place))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", post(admin::advance_order_status))
        .route("/products/pending", get(admin::pending_products))
        .route("/products/{id}/verify", post(admin::verify_product))
        .route("/products/{id}/reject", post(admin::reject_product))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .route("/categories", get(categories::list))
        .nest("/admin", admin_routes())
}

//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (backend reachable)
//!
//! # Catalog
//! GET  /product                   - All products
//! GET  /product/{id}              - Product detail
//! GET  /shop/{category}           - Products of one category
//!
//! # Cart (HTMX fragments or redirects)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add to cart (badge fragment, triggers cart-updated)
//! POST /cart/update               - Set quantity (panel fragment)
//! POST /cart/remove               - Remove line (panel fragment)
//! POST /cart/clear                - Empty the cart (panel fragment)
//! GET  /cart/count                - Cart count badge (fragment)
//! POST /checkout                  - Place the order
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//! GET  /account                   - Account overview (requires auth)
//!
//! # Admin (requires admin role)
//! GET  /admin/products            - Product table
//! POST /admin/products            - Create product
//! GET  /admin/products/new        - New product form
//! GET  /admin/products/edit/{id}  - Edit form
//! POST /admin/products/edit/{id}  - Update product
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;
pub mod layout;
pub mod products;
pub mod shop;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/product", product_routes())
        .route("/shop/{category}", get(shop::category))
        // Cart and checkout
        .nest("/cart", cart_routes())
        .route("/checkout", post(cart::checkout))
        // Accounts
        .nest("/auth", auth_routes())
        .route("/account", get(auth::account))
        // Product administration
        .nest("/admin", admin::routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.backend().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Backend not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

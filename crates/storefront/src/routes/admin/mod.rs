//! Product administration, restricted to admin users.

pub mod form;
pub mod products;

use axum::{Router, routing::get};

use crate::state::AppState;

pub use form::{ProductForm, ProductFormError};

/// Admin routes, nested under `/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index).post(products::create))
        .route("/products/new", get(products::new_page))
        .route("/products/edit", get(products::edit_without_id))
        .route("/products/edit/", get(products::edit_without_id))
        .route(
            "/products/edit/{id}",
            get(products::edit_page).post(products::update),
        )
}


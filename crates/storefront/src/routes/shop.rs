//! Category listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::catalog;

use crate::backend::ProductFilter;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::Layout;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/category.html")]
pub struct CategoryTemplate {
    pub layout: Layout,
    pub category: String,
    pub title: String,
    pub count_label: String,
    pub products: Vec<ProductView>,
}

/// Display the products of one category.
///
/// The path segment arrives percent-decoded; matching ignores case.
#[instrument(skip(state, session, user))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(category): Path<String>,
) -> CategoryTemplate {
    let products = match state.backend().list_products(ProductFilter::All).await {
        Ok(products) => catalog::filter_by_category(products.to_vec(), &category),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products for category");
            Vec::new()
        }
    };

    CategoryTemplate {
        layout: Layout::build(&state, &session, user.as_ref()).await,
        title: format!("{} Products", catalog::category_title(&category)),
        count_label: format!("{} found", catalog::pluralize(products.len(), "product")),
        products: products.iter().map(ProductView::from).collect(),
        category,
    }
}

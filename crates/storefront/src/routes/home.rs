//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::catalog::{self, CategoryCount};

use crate::backend::{BackendError, ProductFilter};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::{Layout, category_href};
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Background image per known category.
const CATEGORY_IMAGES: &[(&str, &str)] = &[
    (
        "Protein",
        "https://springs.com.pk/cdn/shop/files/705016500406.gif?v=1747852022",
    ),
    (
        "Pre Workout",
        "https://cloudinary.images-iherb.com/image/upload/f_auto,q_auto:eco/images/bsn/bsn00160/l/43.jpg",
    ),
    (
        "Weight Gainer",
        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcRrRHSoZidcPOMSOvON9_xusG_tVmdjlxhM4A&s",
    ),
    (
        "Creatine",
        "https://ronniecoleman.net/cdn/shop/products/ronnie-coleman-signature-series-creatine-xs-120-scoop-essentials-28840760115313_1024x1024.jpg?v=1628532764",
    ),
    (
        "BCAA",
        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcTUAHgbw4AlifPEofQ0rV4U-Bfnhf78sXI2AQ&s",
    ),
    (
        "Fat Burner",
        "https://5.imimg.com/data5/SELLER/Default/2023/7/329254266/FR/AX/LT/54948872/muscletech-fat-burner-supplement-500x500.png",
    ),
    (
        "Performance",
        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQbPOGle6oNt7j1E9TaopqPIc6U9P_1NkTV_g&s",
    ),
];

/// Background for categories without their own image.
const FALLBACK_CATEGORY_IMAGE: &str =
    "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400&auto=format&fit=crop&q=80";

/// A tile in the "Shop by Category" queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTile {
    pub name: String,
    pub href: String,
    pub image_url: &'static str,
    pub count_label: String,
}

impl From<CategoryCount> for CategoryTile {
    fn from(category: CategoryCount) -> Self {
        Self {
            href: category_href(&category.name),
            image_url: category_image(&category.name),
            count_label: catalog::pluralize(category.count, "Product"),
            name: category.name,
        }
    }
}

/// Background image for a category name (exact match).
#[must_use]
pub fn category_image(name: &str) -> &'static str {
    CATEGORY_IMAGES
        .iter()
        .find(|(category, _)| *category == name)
        .map_or(FALLBACK_CATEGORY_IMAGE, |(_, url)| *url)
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryTile>,
    pub featured: Vec<ProductView>,
    pub featured_error: Option<String>,
    pub invalid_id_note: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> HomeTemplate {
    let categories = match state.backend().list_products(ProductFilter::All).await {
        Ok(products) => catalog::category_counts(&products)
            .into_iter()
            .map(CategoryTile::from)
            .collect(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load categories");
            Vec::new()
        }
    };

    let (featured, featured_error) = match state
        .backend()
        .list_products(ProductFilter::Featured)
        .await
    {
        Ok(products) => (products.iter().map(ProductView::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load featured products");
            (Vec::new(), Some(featured_error_message(&e)))
        }
    };

    let invalid = featured.iter().filter(|p: &&ProductView| p.href.is_none()).count();
    let invalid_id_note = (invalid > 0).then(|| {
        format!("{invalid} products have invalid IDs and cannot be viewed in detail.")
    });

    HomeTemplate {
        layout: Layout::build(&state, &session, user.as_ref()).await,
        categories,
        featured,
        featured_error,
        invalid_id_note,
    }
}

fn featured_error_message(error: &BackendError) -> String {
    match error {
        BackendError::InvalidFormat(_) => "Invalid data format received from server".to_string(),
        BackendError::Status { status, .. } => format!("HTTP error! status: {}", status.as_u16()),
        _ => "Failed to load featured products".to_string(),
    }
}

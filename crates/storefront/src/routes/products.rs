//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::{Product, ProductId, product::MAX_STARS};

use crate::backend::ProductFilter;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::{Layout, category_href};
use crate::state::AppState;

/// Image shown for products without one.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

const STAR_FILLED: &str = "star star-filled";
const STAR_EMPTY: &str = "star";

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    /// Detail page link; `None` when the product has no usable id.
    pub href: Option<String>,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub category_href: Option<String>,
    pub price: String,
    pub compare_at_price: Option<String>,
    pub discount: Option<String>,
    pub on_sale: bool,
    pub is_new: bool,
    pub is_featured: bool,
    pub is_exclusive: bool,
    pub in_stock: bool,
    pub quantity_in_stock: u32,
    pub size: String,
    pub color: String,
    /// CSS class per star of the rating display.
    pub stars: Vec<&'static str>,
    pub rating: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let valid = product.has_valid_id();
        let compare_at_price = product.compare_at_price().map(|p| p.to_string());
        let filled = product.filled_stars();

        Self {
            id: product.id.to_string(),
            href: valid.then(|| format!("/product/{}", urlencoding::encode(product.id.as_str()))),
            name: product.display_name().to_string(),
            description: product.description.clone(),
            image_url: if product.image_url.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                product.image_url.clone()
            },
            category: product.category_label().to_string(),
            category_href: product.category.as_deref().map(category_href),
            price: product.selling_price().to_string(),
            discount: compare_at_price.as_ref().map(|_| product.discount_label()),
            compare_at_price,
            on_sale: product.on_sale,
            is_new: product.is_new_arrival,
            is_featured: product.is_featured,
            is_exclusive: product.is_exclusive,
            in_stock: product.is_in_stock,
            quantity_in_stock: product.quantity_in_stock,
            size: product.size.clone(),
            color: product.color.clone(),
            stars: (0..MAX_STARS)
                .map(|i| if i < filled { STAR_FILLED } else { STAR_EMPTY })
                .collect(),
            rating: product.rating.normalize().to_string(),
        }
    }
}

impl ProductView {
    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn can_purchase(&self) -> bool {
        self.href.is_some()
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: ProductView,
}

/// Display every product.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> ProductsIndexTemplate {
    let (products, error) = match state.backend().list_products(ProductFilter::All).await {
        Ok(products) => (products.iter().map(ProductView::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            (Vec::new(), Some("Failed to load products".to_string()))
        }
    };

    ProductsIndexTemplate {
        layout: Layout::build(&state, &session, user.as_ref()).await,
        products,
        error,
    }
}

/// Display product detail page.
#[instrument(skip(state, session, user), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<String>,
) -> Result<ProductShowTemplate> {
    let id = ProductId::new(id);
    if id.is_placeholder() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let product = state.backend().get_product(&id).await?;

    Ok(ProductShowTemplate {
        layout: Layout::build(&state, &session, user.as_ref()).await,
        product: ProductView::from(&product),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use supplimax_core::RawProduct;

    use super::*;

    fn view(value: serde_json::Value, index: usize) -> ProductView {
        let raw: RawProduct = serde_json::from_value(value).unwrap();
        ProductView::from(&Product::from_raw(raw, index))
    }

    #[test]
    fn test_view_formats_prices_and_badges() {
        let v = view(
            json!({
                "id": "p1",
                "name": "Whey Gold",
                "price": 40,
                "discountPercentage": 20,
                "rating": 3.8,
                "isNewArrival": true,
                "category": "Pre Workout"
            }),
            0,
        );
        assert_eq!(v.price, "$40.00");
        assert_eq!(v.compare_at_price.as_deref(), Some("$50.00"));
        assert_eq!(v.discount.as_deref(), Some("20"));
        assert!(v.is_new);
        assert_eq!(
            v.stars,
            vec![STAR_FILLED, STAR_FILLED, STAR_FILLED, STAR_EMPTY, STAR_EMPTY]
        );
        assert_eq!(v.href.as_deref(), Some("/product/p1"));
        assert_eq!(v.category_href.as_deref(), Some("/shop/Pre%20Workout"));
    }

    #[test]
    fn test_view_defaults() {
        let v = view(json!({ "price": 12 }), 4);
        assert_eq!(v.id, "temp-5");
        assert!(v.href.is_none());
        assert!(!v.can_purchase());
        assert_eq!(v.name, "Unnamed Product");
        assert_eq!(v.category, "Uncategorized");
        assert_eq!(v.image_url, PLACEHOLDER_IMAGE);
        assert!(v.discount.is_none());
        assert_eq!(v.stars, vec![STAR_EMPTY; 5]);
    }
}

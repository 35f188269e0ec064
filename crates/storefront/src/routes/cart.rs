//! Cart route handlers.
//!
//! Cart operations accept plain form posts and HTMX requests. HTMX requests get
//! fragments back with an `HX-Trigger: cart-updated` header; plain posts are
//! redirected to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::{Cart, CartItem, OrderSummary, PricingPolicy, Price, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::layout::{Layout, set_flash};
use crate::routes::products::PLACEHOLDER_IMAGE;
use crate::services::CartService;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
    pub decrement_to: i64,
    pub increment_to: i64,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let quantity = i64::from(item.quantity);
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image_url: if item.image_url.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                item.image_url.clone()
            },
            category: item.category.clone(),
            price: Price::usd(item.price).to_string(),
            quantity: item.quantity,
            line_total: Price::usd(item.line_total()).to_string(),
            decrement_to: quantity - 1,
            increment_to: quantity + 1,
        }
    }
}

/// Order summary display data.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub free_shipping: bool,
}

impl From<OrderSummary> for SummaryView {
    fn from(summary: OrderSummary) -> Self {
        Self {
            subtotal: Price::usd(summary.subtotal).to_string(),
            shipping: summary.shipping_label(),
            tax: Price::usd(summary.tax).to_string(),
            total: Price::usd(summary.total).to_string(),
            free_shipping: summary.has_free_shipping(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub line_count: usize,
    pub item_count: u32,
    pub summary: SummaryView,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, pricing: &PricingPolicy) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            summary: SummaryView::from(pricing.summarize(cart.total())),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart items and summary fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/order_placed.html")]
pub struct OrderPlacedTemplate {
    pub layout: Layout,
    pub message: &'static str,
    pub summary: SummaryView,
    pub item_count: u32,
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// Respond to a cart change with the panel fragment or a redirect.
fn cart_changed(headers: &HeaderMap, cart: &Cart, pricing: &PricingPolicy) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartPanelTemplate {
                cart: CartView::new(cart, pricing),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartShowTemplate> {
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .load()
        .await?;

    Ok(CartShowTemplate {
        cart: CartView::new(&cart, state.pricing()),
        layout: Layout::build(&state, &session, user.as_ref()).await,
    })
}

/// Add an item to the cart.
///
/// The product is read from the backend; the price is never taken from the
/// form.
#[instrument(skip(state, session, user, headers, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    if id.as_str().is_empty() || id.is_placeholder() {
        return Err(AppError::BadRequest(
            "This product cannot be added to the cart".to_string(),
        ));
    }

    let product = state.backend().get_product(&id).await?;
    let item = CartItem::from_product(&product, form.quantity.unwrap_or(1));
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .add(item)
        .await?;

    add_breadcrumb("cart", "Added to cart", &[("product_id", id.as_str())]);

    if is_htmx(&headers) {
        Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response())
    } else {
        Ok(Redirect::to("/cart").into_response())
    }
}

/// Set the quantity of a cart line; zero or less removes it.
#[instrument(skip(state, session, user, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .update_quantity(&ProductId::new(form.product_id), form.quantity)
        .await?;

    Ok(cart_changed(&headers, &cart, state.pricing()))
}

/// Remove a cart line.
#[instrument(skip(state, session, user, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .remove(&ProductId::new(form.product_id))
        .await?;

    Ok(cart_changed(&headers, &cart, state.pricing()))
}

/// Empty the cart.
#[instrument(skip(state, session, user, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    headers: HeaderMap,
) -> Result<Response> {
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .clear()
        .await?;

    Ok(cart_changed(&headers, &cart, state.pricing()))
}

/// Cart count badge (for HTMX).
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartCountTemplate> {
    let cart = CartService::new(state.backend(), &session, user.as_ref())
        .load()
        .await?;

    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Place the order.
///
/// Guests are sent to log in first and come back to the cart. There is no
/// payment step: a logged-in user's cart is confirmed and cleared.
#[instrument(skip(state, session, user))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let Some(user) = user else {
        return Ok(Redirect::to("/auth/login?next=%2Fcart").into_response());
    };

    let service = CartService::new(state.backend(), &session, Some(&user));
    let cart = service.load().await?;

    if cart.is_empty() {
        set_flash(&session, "Your cart is empty").await;
        return Ok(Redirect::to("/cart").into_response());
    }

    let summary = SummaryView::from(state.pricing().summarize(cart.total()));
    let item_count = cart.item_count();
    service.clear().await?;

    tracing::info!(user_id = %user.id, item_count, total = %summary.total, "Order placed");
    add_breadcrumb("checkout", "Order placed", &[("user_id", user.id.as_str())]);

    Ok(OrderPlacedTemplate {
        layout: Layout::build(&state, &session, Some(&user)).await,
        message: "Order placed successfully!",
        summary,
        item_count,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn cart() -> Cart {
        Cart::from_items(vec![CartItem {
            id: ProductId::new("p1"),
            name: "Creatine".to_string(),
            price: Decimal::new(1250, 2),
            image_url: String::new(),
            category: "Creatine".to_string(),
            quantity: 2,
        }])
    }

    #[test]
    fn test_cart_view() {
        let view = CartView::new(&cart(), &PricingPolicy::default());
        assert_eq!(view.line_count, 1);
        assert_eq!(view.item_count, 2);
        let line = &view.items[0];
        assert_eq!(line.price, "$12.50");
        assert_eq!(line.line_total, "$25.00");
        assert_eq!(line.decrement_to, 1);
        assert_eq!(line.increment_to, 3);
        assert_eq!(line.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(view.summary.subtotal, "$25.00");
        assert_eq!(view.summary.shipping, "$5.99");
        assert_eq!(view.summary.tax, "$2.00");
        assert_eq!(view.summary.total, "$32.99");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&Cart::new(), &PricingPolicy::default());
        assert!(view.is_empty());
        assert_eq!(view.summary.total, "$5.99");
    }

    #[test]
    fn test_htmx_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", axum::http::HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_plain_post_redirects_to_cart() {
        let response = cart_changed(&HeaderMap::new(), &cart(), &PricingPolicy::default());
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/cart")
        );
    }
}

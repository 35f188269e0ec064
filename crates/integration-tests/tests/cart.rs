//! Integration tests for the cart, guest and logged-in.

use reqwest::StatusCode;
use serde_json::{Value, json};
use supplimax_core::MAX_LINE_QUANTITY;
use supplimax_integration_tests::{TestContext, location};

fn cart_items(cart: &Value) -> Vec<(String, u64)> {
    cart["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    (
                        item["id"].as_str().unwrap_or_default().to_string(),
                        item["quantity"].as_u64().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Guest cart
// ============================================================================

#[tokio::test]
async fn test_empty_cart_page() {
    let ctx = TestContext::new().await;
    let body = ctx.page("/cart").await;

    assert!(body.contains("Your cart is empty"));
    assert!(body.contains("Continue Shopping"));
}

#[tokio::test]
async fn test_guest_add_update_remove() {
    let ctx = TestContext::new().await;

    let response = ctx.post_form("/cart/add", &[("product_id", "p3")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));

    ctx.post_form("/cart/add", &[("product_id", "p3"), ("quantity", "2")])
        .await;
    ctx.post_form("/cart/add", &[("product_id", "p2")]).await;

    let body = ctx.page("/cart").await;
    assert!(body.contains("Cart Items (2)"));
    assert!(body.contains("Creatine Monohydrate"));
    assert!(body.contains("$37.50"));
    // 37.50 + 40.00 = 77.50 is over the free shipping threshold
    assert!(body.contains("$77.50"));
    assert!(body.contains("FREE"));

    let count = ctx.get("/cart/count").await.text().await.unwrap_or_default();
    assert_eq!(count.trim(), "4");

    ctx.post_form("/cart/update", &[("product_id", "p3"), ("quantity", "0")])
        .await;
    let body = ctx.page("/cart").await;
    assert!(body.contains("Cart Items (1)"));
    assert!(!body.contains("Creatine Monohydrate"));

    ctx.post_form("/cart/remove", &[("product_id", "p2")]).await;
    let body = ctx.page("/cart").await;
    assert!(body.contains("Your cart is empty"));

    // Guests never touch the backend's carts
    assert!(
        !ctx.backend
            .requests()
            .iter()
            .any(|r| r.contains("/carts"))
    );
}

#[tokio::test]
async fn test_small_cart_pays_shipping() {
    let ctx = TestContext::new().await;
    ctx.post_form("/cart/add", &[("product_id", "p3")]).await;

    let body = ctx.page("/cart").await;
    assert!(body.contains("$5.99"));
    assert!(body.contains("$1.00"));
    // 12.50 + 5.99 + 1.00
    assert!(body.contains("$19.49"));
}

#[tokio::test]
async fn test_huge_quantity_of_expensive_product_still_renders() {
    let ctx = TestContext::with_products(vec![json!({
        "id": "gold",
        "name": "Solid Gold Shaker",
        "price": 1e20,
        "quantityInStock": 1,
        "category": "Performance"
    })])
    .await;

    ctx.post_form("/cart/add", &[("product_id", "gold")]).await;
    let response = ctx
        .post_form(
            "/cart/update",
            &[("product_id", "gold"), ("quantity", "1000000000")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = ctx.page("/cart").await;
    assert!(body.contains("Solid Gold Shaker"));

    let count = ctx.get("/cart/count").await.text().await.unwrap_or_default();
    assert_eq!(count.trim(), MAX_LINE_QUANTITY.to_string());
}

#[tokio::test]
async fn test_htmx_add_returns_badge_fragment() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_htmx("/cart/add", &[("product_id", "p1"), ("quantity", "3")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("HX-Trigger")
            .and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    assert_eq!(response.text().await.unwrap_or_default().trim(), "3");

    let response = ctx.post_htmx("/cart/clear", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fragment = response.text().await.unwrap_or_default();
    assert!(fragment.contains("id=\"cart-panel\""));
    assert!(fragment.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_add_rejects_unknown_and_placeholder_products() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_form("/cart/add", &[("product_id", "does-not-exist")])
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx.post_form("/cart/add", &[("product_id", "temp-4")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.post_form("/cart/add", &[("product_id", "")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = ctx.page("/cart").await;
    assert!(body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_guest_checkout_requires_login() {
    let ctx = TestContext::new().await;
    ctx.post_form("/cart/add", &[("product_id", "p1")]).await;

    let response = ctx.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/auth/login?next=%2Fcart"));

    // The cart is untouched
    let body = ctx.page("/cart").await;
    assert!(body.contains("Gold Standard Whey"));
}

// ============================================================================
// Logged-in cart
// ============================================================================

#[tokio::test]
async fn test_logged_in_changes_are_saved_to_backend() {
    let ctx = TestContext::new().await;
    ctx.register("Jamie Rivera", "jamie@example.com").await;

    ctx.post_form("/cart/add", &[("product_id", "p1")]).await;
    let carts = ctx.backend.records("carts");
    assert_eq!(carts.len(), 1);
    assert_eq!(cart_items(&carts[0]), vec![("p1".to_string(), 1)]);
    assert!(carts[0]["createdAt"].is_string());

    ctx.post_form("/cart/update", &[("product_id", "p1"), ("quantity", "5")])
        .await;
    let carts = ctx.backend.records("carts");
    assert_eq!(carts.len(), 1);
    assert_eq!(cart_items(&carts[0]), vec![("p1".to_string(), 5)]);
    assert!(
        ctx.backend
            .requests()
            .iter()
            .any(|r| r.starts_with("PUT /carts/"))
    );
}

#[tokio::test]
async fn test_failed_remote_save_keeps_session_cart() {
    let ctx = TestContext::new().await;
    ctx.register("Jamie Rivera", "jamie@example.com").await;

    // Warm the product cache, then take the backend down
    ctx.page("/product/p3").await;
    ctx.backend.set_failing(true);

    let response = ctx.post_form("/cart/add", &[("product_id", "p3")]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = ctx.page("/cart").await;
    assert!(body.contains("Creatine Monohydrate"));
    assert!(ctx.backend.records("carts").is_empty());
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.register("Jamie Rivera", "jamie@example.com").await;
    ctx.post_form("/cart/add", &[("product_id", "p2")]).await;

    let response = ctx.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap_or_default();
    assert!(body.contains("Order placed successfully!"));
    assert!(body.contains("$40.00"));

    let body = ctx.page("/cart").await;
    assert!(body.contains("Your cart is empty"));
    let carts = ctx.backend.records("carts");
    assert!(cart_items(&carts[0]).is_empty());
}

#[tokio::test]
async fn test_checkout_with_empty_cart_returns_to_cart() {
    let ctx = TestContext::new().await;
    ctx.register("Jamie Rivera", "jamie@example.com").await;

    let response = ctx.post_form("/checkout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/cart"));

    let body = ctx.page("/cart").await;
    assert!(body.contains("Your cart is empty"));
}

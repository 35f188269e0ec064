//! Integration tests for the catalog pages and health checks.

use reqwest::StatusCode;
use serde_json::json;
use supplimax_integration_tests::TestContext;

// ============================================================================
// Home
// ============================================================================

#[tokio::test]
async fn test_home_shows_categories_and_featured_products() {
    let ctx = TestContext::new().await;
    let body = ctx.page("/").await;

    // Category queue in first-appearance order with counts
    let protein = body.find("/shop/Protein").expect("Protein tile");
    let pre = body.find("/shop/Pre%20Workout").expect("Pre Workout tile");
    assert!(protein < pre);
    assert!(body.contains("2 Products"));
    assert!(body.contains("1 Product<"));

    // Featured products, including the one without an id
    assert!(body.contains("Featured Products"));
    assert!(body.contains("Gold Standard Whey"));
    assert!(body.contains("Pump Pre"));
    assert!(body.contains("Mystery Blend"));
    assert!(!body.contains("Creatine Monohydrate"));
    assert!(body.contains("NO ID"));
    assert!(body.contains("1 products have invalid IDs and cannot be viewed in detail."));
    assert!(body.contains("-20%"));
}

#[tokio::test]
async fn test_home_degrades_when_backend_fails() {
    let ctx = TestContext::with_products(Vec::new()).await;
    ctx.backend.set_failing(true);

    let body = ctx.page("/").await;
    assert!(body.contains("HTTP error! status: 500"));
    assert!(body.contains("Try Again"));
    // Navigation falls back to the static category list
    assert!(body.contains("Weight Gainer"));
    assert!(body.contains("Performance"));
}

#[tokio::test]
async fn test_home_without_featured_products() {
    let ctx = TestContext::with_products(vec![json!({
        "id": "only",
        "name": "Plain Protein",
        "price": 10,
        "category": "Protein"
    })])
    .await;

    let body = ctx.page("/").await;
    assert!(body.contains("No featured products available at the moment."));
    assert!(body.contains("1 Product<"));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_all_products_page() {
    let ctx = TestContext::new().await;
    let body = ctx.page("/product").await;

    for name in [
        "Gold Standard Whey",
        "Pump Pre",
        "Creatine Monohydrate",
        "Mystery Blend",
    ] {
        assert!(body.contains(name), "missing {name}");
    }
    assert!(body.contains("href=\"/product/p1\""));
    assert!(body.contains("$12.50"));
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;

    let body = ctx.page("/product/p1").await;
    assert!(body.contains("Gold Standard Whey"));
    assert!(body.contains("$59.99"));
    assert!(body.contains("In Stock (25 available)"));
    assert!(body.contains("Vanilla"));
    assert!(body.contains("name=\"product_id\" value=\"p1\""));

    let body = ctx.page("/product/p2").await;
    assert!(body.contains("$40.00"));
    assert!(body.contains("$50.00"));
    assert!(body.contains("NEW"));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/product/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx.get("/product/temp-4").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_page() {
    let ctx = TestContext::new().await;

    let body = ctx.page("/shop/Pre%20Workout").await;
    assert!(body.contains("Pre Workout Products"));
    assert!(body.contains("1 product found"));
    assert!(body.contains("Pump Pre"));
    assert!(body.contains("20% OFF"));
    assert!(body.contains("NEW"));
    assert!(!body.contains("Gold Standard Whey"));
}

#[tokio::test]
async fn test_category_matching_ignores_case() {
    let ctx = TestContext::new().await;

    let body = ctx.page("/shop/protein").await;
    assert!(body.contains("Protein Products"));
    assert!(body.contains("2 products found"));
    assert!(body.contains("Gold Standard Whey"));
    assert!(body.contains("Mystery Blend"));
    assert!(body.contains("FEATURED"));

    let body = ctx.page("/shop/creatine").await;
    assert!(body.contains("EXCLUSIVE"));
}

#[tokio::test]
async fn test_empty_category() {
    let ctx = TestContext::new().await;

    let body = ctx.page("/shop/fat-burner").await;
    assert!(body.contains("Fat Burner Products"));
    assert!(body.contains("0 products found"));
    assert!(body.contains("href=\"/admin/products/new\""));
}

// ============================================================================
// Chrome and health
// ============================================================================

#[tokio::test]
async fn test_navigation_chrome() {
    let ctx = TestContext::new().await;
    let body = ctx.page("/product").await;

    for label in ["About Us", "Contact", "Orders", "FAQ", "Offers", "Blog", "Wishlist"] {
        assert!(body.contains(label), "missing {label}");
    }
    assert!(body.contains("href=\"/auth/login\""));
    assert!(body.contains("href=\"/shop/Creatine\""));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/static/images/placeholder.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_checks() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap_or_default(), "ok");

    let response = ctx.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.backend.set_failing(true);
    let response = ctx.get("/health/ready").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

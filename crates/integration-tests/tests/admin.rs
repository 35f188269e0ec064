//! Integration tests for product administration.

use reqwest::StatusCode;
use supplimax_integration_tests::{TestContext, location};

async fn admin_context() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.create_admin("admin@example.com").await;
    let response = ctx.login("admin@example.com").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    ctx
}

fn whey_form(price: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Gold Standard Whey 5lb".to_string()),
        ("category", "Protein".to_string()),
        ("price", price.to_string()),
        ("cost", "30".to_string()),
        ("discount_percentage", "0".to_string()),
        ("quantity_in_stock", "25".to_string()),
        ("size", "5 lb".to_string()),
        ("rating", "4.7".to_string()),
        ("color", "Vanilla".to_string()),
        ("description", "24g of protein per scoop".to_string()),
        ("image_url", "https://img.example.com/whey.jpg".to_string()),
        ("is_in_stock", "on".to_string()),
        ("is_featured", "on".to_string()),
    ]
}

fn as_pairs<'a>(form: &'a [(&'static str, String)]) -> Vec<(&'static str, &'a str)> {
    form.iter().map(|(k, v)| (*k, v.as_str())).collect()
}

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn test_guest_is_sent_to_login() {
    let ctx = TestContext::new().await;
    let response = ctx.get("/admin/products").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        Some("/auth/login?next=%2Fadmin%2Fproducts")
    );
}

#[tokio::test]
async fn test_customer_is_forbidden() {
    let ctx = TestContext::new().await;
    ctx.register("Jamie Rivera", "jamie@example.com").await;

    let response = ctx.get("/admin/products").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .post_form("/admin/products", &[("name", "Sneaky"), ("price", "1")])
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!ctx.backend.requests().contains(&"POST /products".to_string()));
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_admin_sees_product_table() {
    let ctx = admin_context().await;
    let body = ctx.page("/admin/products").await;

    assert!(body.contains("Gold Standard Whey"));
    assert!(body.contains("Creatine Monohydrate"));
    assert!(body.contains("/admin/products/edit/p1"));
    assert!(body.contains("/admin/products/edit/p3"));
    assert!(body.contains("No ID"));
    assert!(body.contains("/admin/products/new"));
}

// ============================================================================
// Edit
// ============================================================================

#[tokio::test]
async fn test_edit_rejects_missing_ids() {
    let ctx = admin_context().await;

    for path in ["/admin/products/edit/undefined", "/admin/products/edit/"] {
        let response = ctx.get(path).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = response.text().await.unwrap_or_default();
        assert!(body.contains("Product ID is missing or invalid"), "{path}");
    }
}

#[tokio::test]
async fn test_edit_unknown_product() {
    let ctx = admin_context().await;
    let response = ctx.get("/admin/products/edit/nope").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response.text().await.unwrap_or_default();
    assert!(body.contains("exist or has been deleted"));
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let ctx = admin_context().await;
    let body = ctx.page("/admin/products/edit/p1").await;

    assert!(body.contains("value=\"Gold Standard Whey\""));
    assert!(body.contains("value=\"Protein\""));
    assert!(body.contains("action=\"/admin/products/edit/p1\""));
}

#[tokio::test]
async fn test_edit_rejects_negative_price() {
    let ctx = admin_context().await;
    let form = whey_form("-5");
    let response = ctx
        .post_form("/admin/products/edit/p1", &as_pairs(&form))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.text().await.unwrap_or_default();
    assert!(body.contains("Price cannot be negative"));
    assert!(!ctx.backend.requests().contains(&"PATCH /products/p1".to_string()));
}

#[tokio::test]
async fn test_edit_updates_product() {
    let ctx = admin_context().await;
    // Warm the catalog cache so the update has to invalidate it.
    ctx.page("/product/p1").await;

    let form = whey_form("74.99");
    let response = ctx
        .post_form("/admin/products/edit/p1", &as_pairs(&form))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/products"));
    assert!(ctx.backend.requests().contains(&"PATCH /products/p1".to_string()));

    let stored = ctx
        .backend
        .records("products")
        .into_iter()
        .find(|p| p["id"] == "p1")
        .expect("p1 still stored");
    assert_eq!(stored["name"], "Gold Standard Whey 5lb");
    assert_eq!(stored["sku"], "WHEY-2LB");

    let body = ctx.page("/admin/products").await;
    assert!(body.contains("Updated Gold Standard Whey 5lb"));

    let body = ctx.page("/product/p1").await;
    assert!(body.contains("Gold Standard Whey 5lb"));
}

#[tokio::test]
async fn test_update_unknown_product() {
    let ctx = admin_context().await;
    let form = whey_form("10");
    let response = ctx
        .post_form("/admin/products/edit/nope", &as_pairs(&form))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_new_product_form() {
    let ctx = admin_context().await;
    let body = ctx.page("/admin/products/new").await;

    assert!(body.contains("Add Product"));
    assert!(body.contains("Create Product"));
    assert!(body.contains("action=\"/admin/products\""));
}

#[tokio::test]
async fn test_create_product() {
    let ctx = admin_context().await;
    let before = ctx.backend.records("products").len();

    let response = ctx
        .post_form(
            "/admin/products",
            &[
                ("name", "Casein Night"),
                ("category", "Protein"),
                ("price", "44.50"),
                ("quantity_in_stock", "12"),
                ("is_in_stock", "on"),
            ],
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/products"));

    let records = ctx.backend.records("products");
    assert_eq!(records.len(), before + 1);
    let created = records
        .iter()
        .find(|p| p["name"] == "Casein Night")
        .expect("created record");
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));

    let body = ctx.page("/shop/protein").await;
    assert!(body.contains("Casein Night"));
}

#[tokio::test]
async fn test_create_requires_name() {
    let ctx = admin_context().await;
    let before = ctx.backend.records("products").len();

    let response = ctx
        .post_form(
            "/admin/products",
            &[("name", "  "), ("category", "Protein"), ("price", "5")],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(ctx.backend.records("products").len(), before);
}

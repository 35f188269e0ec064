//! Product administration route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use supplimax_core::{Product, ProductId};

use crate::backend::{BackendError, ProductFilter};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::layout::{Layout, set_flash};
use crate::state::AppState;

use super::form::ProductForm;

/// Product row in the admin table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price: String,
    pub quantity_in_stock: u32,
    pub in_stock: bool,
    pub category: String,
    /// `None` for records without a usable id.
    pub edit_href: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.display_name().to_string(),
            price: product.selling_price().to_string(),
            quantity_in_stock: product.quantity_in_stock,
            in_stock: product.is_in_stock,
            category: product.category_label().to_string(),
            edit_href: product.has_valid_id().then(|| {
                format!(
                    "/admin/products/edit/{}",
                    urlencoding::encode(product.id.as_str())
                )
            }),
        }
    }
}

/// Admin product table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct AdminProductsTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRow>,
    pub error: Option<String>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ProductForm,
    pub error: Option<String>,
}

/// Page shown when the product to edit cannot be loaded.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/missing.html")]
pub struct MissingProductTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub message: String,
}

fn edit_action(id: &ProductId) -> String {
    format!("/admin/products/edit/{}", urlencoding::encode(id.as_str()))
}

/// Ids the edit page refuses outright.
fn is_missing_id(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || id == "undefined"
}

async fn invalid_id_page(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    id: &str,
) -> Response {
    tracing::warn!(product_id = %id, "Invalid product id for edit");
    let page = MissingProductTemplate {
        layout: Layout::build(state, session, Some(user)).await,
        heading: "Invalid Product ID",
        message: format!("Product ID is missing or invalid: \"{id}\""),
    };
    (StatusCode::BAD_REQUEST, page).into_response()
}

async fn not_found_page(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    id: &ProductId,
) -> Response {
    let page = MissingProductTemplate {
        layout: Layout::build(state, session, Some(user)).await,
        heading: "Product Not Found",
        message: format!("The product with ID \"{id}\" doesn't exist or has been deleted."),
    };
    (StatusCode::NOT_FOUND, page).into_response()
}

// =============================================================================
// Listing
// =============================================================================

/// Display the product table.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> AdminProductsTemplate {
    let (products, error) = match state.backend().list_products(ProductFilter::All).await {
        Ok(products) => (products.iter().map(ProductRow::from).collect(), None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products for admin");
            (Vec::new(), Some("Failed to load products".to_string()))
        }
    };

    AdminProductsTemplate {
        layout: Layout::build(&state, &session, Some(&user)).await,
        products,
        error,
    }
}

// =============================================================================
// Create
// =============================================================================

/// Display the empty product form.
pub async fn new_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> ProductFormTemplate {
    ProductFormTemplate {
        layout: Layout::build(&state, &session, Some(&user)).await,
        title: "Add Product",
        action: "/admin/products".to_string(),
        submit_label: "Create Product",
        form: ProductForm::blank(),
        error: None,
    }
}

/// Handle product creation.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = match form.validate(ProductId::new("")) {
        Ok(product) => product,
        Err(e) => {
            let page = ProductFormTemplate {
                layout: Layout::build(&state, &session, Some(&user)).await,
                title: "Add Product",
                action: "/admin/products".to_string(),
                submit_label: "Create Product",
                form,
                error: Some(e.to_string()),
            };
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let created = state.backend().create_product(&product).await?;

    tracing::info!(product_id = %created.id, "Product created");
    add_breadcrumb("admin", "Product created", &[("product_id", created.id.as_str())]);
    set_flash(&session, &format!("Created {}", created.display_name())).await;

    Ok(Redirect::to("/admin/products").into_response())
}

// =============================================================================
// Edit
// =============================================================================

/// Edit page reached without an id.
pub async fn edit_without_id(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Response {
    invalid_id_page(&state, &session, &user, "").await
}

/// Display the edit form, prefilled from the backend's current record.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    if is_missing_id(&id) {
        return Ok(invalid_id_page(&state, &session, &user, &id).await);
    }
    let id = ProductId::new(id);

    let product = match state.backend().get_product_fresh(&id).await {
        Ok(product) => product,
        Err(BackendError::NotFound(_)) => {
            tracing::warn!(product_id = %id, "Product to edit not found");
            return Ok(not_found_page(&state, &session, &user, &id).await);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ProductFormTemplate {
        layout: Layout::build(&state, &session, Some(&user)).await,
        title: "Edit Product",
        action: edit_action(&id),
        submit_label: "Update Product",
        form: ProductForm::from_product(&product),
        error: None,
    }
    .into_response())
}

/// Handle the edit form submission.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    if is_missing_id(&id) {
        return Ok(invalid_id_page(&state, &session, &user, &id).await);
    }
    let id = ProductId::new(id);

    let product = match form.validate(id.clone()) {
        Ok(product) => product,
        Err(e) => {
            let page = ProductFormTemplate {
                layout: Layout::build(&state, &session, Some(&user)).await,
                title: "Edit Product",
                action: edit_action(&id),
                submit_label: "Update Product",
                form,
                error: Some(e.to_string()),
            };
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    match state.backend().update_product(&id, &product).await {
        Ok(updated) => {
            tracing::info!(product_id = %id, "Product updated");
            add_breadcrumb("admin", "Product updated", &[("product_id", id.as_str())]);
            set_flash(&session, &format!("Updated {}", updated.display_name())).await;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(BackendError::NotFound(_)) => Ok(not_found_page(&state, &session, &user, &id).await),
        Err(e) => Err(e.into()),
    }
}

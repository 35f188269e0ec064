//! Authentication and account route handlers.
//!
//! Password login and registration against the backend's `/users`
//! collection. A successful login moves the visitor's cart over to their
//! account (see [`crate::services::cart::adopt_on_login`]).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::UserRecord;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::routes::layout::Layout;
use crate::services::auth::{AuthError, AuthService, MIN_PASSWORD_LENGTH};
use crate::services::{CartService, cart};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub next: Option<String>,
}

/// Query parameters carrying the page to return to.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub email: String,
    pub next: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
    pub next: String,
    pub min_password_length: usize,
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub role: &'static str,
    pub cart_count: u32,
}

/// Only same-site paths are accepted as redirect targets.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Turn an auth failure into a message for the form, or an error page when
/// the failure is not the visitor's.
fn form_error(error: AuthError) -> std::result::Result<(StatusCode, String), AppError> {
    let app_error = AppError::Auth(error);
    let status = app_error.status();
    if status.is_server_error() {
        Err(app_error)
    } else {
        Ok((status, app_error.public_message()))
    }
}

/// Log the user in on this session.
async fn start_session(state: &AppState, session: &Session, user: UserRecord) -> Result<()> {
    // New id on privilege change
    session.cycle_id().await?;

    let current = CurrentUser::from(user);
    set_current_user(session, &current).await?;
    cart::adopt_on_login(state.backend(), session, &current).await?;

    set_sentry_user(&current.id, Some(&current.email));
    add_breadcrumb("auth", "Logged in", &[("user_id", current.id.as_str())]);
    tracing::info!(user_id = %current.id, "User logged in");
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::build(&state, &session, None).await,
        error: None,
        email: String::new(),
        next: safe_next(query.next.as_deref()),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref());

    match AuthService::new(state.backend())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            start_session(&state, &session, user).await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let (status, message) = form_error(e)?;
            let page = LoginTemplate {
                layout: Layout::build(&state, &session, None).await,
                error: Some(message),
                email: form.email,
                next,
            };
            Ok((status, page).into_response())
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
) -> RegisterTemplate {
    RegisterTemplate {
        layout: Layout::build(&state, &session, None).await,
        error: None,
        name: String::new(),
        email: String::new(),
        next: safe_next(query.next.as_deref()),
        min_password_length: MIN_PASSWORD_LENGTH,
    }
}

/// Handle registration form submission. A new account is logged in at once.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref());

    let result = if form.password == form.password_confirm {
        match AuthService::new(state.backend())
            .register_with_password(&form.name, &form.email, &form.password)
            .await
        {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                Err(form_error(e)?)
            }
        }
    } else {
        Err((StatusCode::BAD_REQUEST, "Passwords do not match".to_string()))
    };

    match result {
        Ok(user) => {
            start_session(&state, &session, user).await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err((status, message)) => {
            let page = RegisterTemplate {
                layout: Layout::build(&state, &session, None).await,
                error: Some(message),
                name: form.name,
                email: form.email,
                next,
                min_password_length: MIN_PASSWORD_LENGTH,
            };
            Ok((status, page).into_response())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Forgets the user and their cart copy; a guest cart from before login
/// becomes active again.
pub async fn logout(session: Session) -> Result<Response> {
    cart::forget_user(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Account Route
// =============================================================================

/// Display the account overview.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn account(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate> {
    let cart = CartService::new(state.backend(), &session, Some(&user))
        .load()
        .await?;

    Ok(AccountTemplate {
        layout: Layout::build(&state, &session, Some(&user)).await,
        role: user.role.label(),
        cart_count: cart.item_count(),
        name: user.name,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/cart")), "/cart");
        assert_eq!(safe_next(Some("/admin/products?x=1")), "/admin/products?x=1");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_form_error_keeps_visitor_mistakes_on_the_form() {
        let (status, message) = form_error(AuthError::UserAlreadyExists).unwrap_or_default();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(message, "An account with this email already exists");

        assert!(form_error(AuthError::PasswordHash).is_err());
    }
}

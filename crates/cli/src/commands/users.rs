//! User management commands.

use secrecy::{ExposeSecret, SecretString};

use supplimax_storefront::services::AuthService;

/// Create an administrator account.
///
/// The account can sign in on the storefront at once and manage products.
///
/// # Errors
///
/// Returns an error if the details are invalid, the email is taken, or the
/// backend cannot be reached.
pub async fn create_admin(
    email: &str,
    name: &str,
    password: &SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::backend()?;

    tracing::info!("Creating admin user: {}", email);
    let user = AuthService::new(&backend)
        .register_admin(name, email, password.expose_secret())
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role.label()
    );
    Ok(())
}

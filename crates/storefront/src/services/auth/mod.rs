//! Authentication service.
//!
//! Password accounts stored in the backend's `/users` collection.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use supplimax_core::{Email, UserRole};

use crate::backend::types::timestamp_now;
use crate::backend::{BackendClient, NewUser, UserRecord};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    backend: &'a BackendClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Register a new customer with name, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingName` if the name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register_with_password(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        self.register(name, email, password, UserRole::Customer)
            .await
    }

    /// Register an administrator account.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register_with_password`].
    pub async fn register_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        self.register(name, email, password, UserRole::Admin).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<UserRecord, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }
        let email = Email::parse(email)?;
        validate_password(password)?;

        // The backend does not enforce unique emails
        if self
            .backend
            .find_user_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = NewUser {
            name: name.to_string(),
            email: email.into_inner(),
            password_hash: hash_password(password)?,
            role,
            created_at: timestamp_now(),
        };

        Ok(self.backend.create_user(&user).await?)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .backend
            .find_user_by_email(email.as_str())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_missing_hash() {
        assert!(matches!(
            verify_password("anything", ""),
            Err(AuthError::InvalidCredentials)
        ));
    }
}

//! Authentication service.
//!
//! Handles registration, login, profile updates, and password resets over
//! the user repository. Token minting lives in [`token`].

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{TokenError, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use atlas_core::{Email, UserId, Username};

use crate::db::users::IdentityConflict;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with username, email, and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` if an
    /// identity field fails validation.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::Conflict` if the username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        // Pre-check so the caller learns which field collides; the unique
        // indexes remain the backstop for the read-then-write race.
        match self
            .users
            .find_identity_conflict(&username, &email, None)
            .await?
        {
            Some(IdentityConflict::Username) => {
                return Err(AuthError::Conflict("Username already exists".to_owned()));
            }
            Some(IdentityConflict::Email) => {
                return Err(AuthError::Conflict("Email already exists".to_owned()));
            }
            None => {}
        }

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    AuthError::Conflict("Username or email already exists".to_owned())
                }
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username or email plus password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no identifier matches or
    /// the password is wrong.
    pub async fn login(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: &str,
    ) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .find_with_password(username, email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update a user's username and email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if either field is already in use by
    /// another account.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;

        match self
            .users
            .find_identity_conflict(&username, &email, Some(user_id))
            .await?
        {
            Some(IdentityConflict::Username) => {
                return Err(AuthError::Conflict("Username already in use".to_owned()));
            }
            Some(IdentityConflict::Email) => {
                return Err(AuthError::Conflict("Email already in use".to_owned()));
            }
            None => {}
        }

        let user = self
            .users
            .update_profile(user_id, &username, &email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                RepositoryError::Conflict(_) => {
                    AuthError::Conflict("Username or email already in use".to_owned())
                }
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Replace a user's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CurrentPasswordIncorrect` if the current password
    /// doesn't match, and `AuthError::WeakPassword` if the new one is too
    /// short.
    pub async fn reset_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;

        let stored_hash = self
            .users
            .password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current_password, &stored_hash)
            .map_err(|_| AuthError::CurrentPasswordIncorrect)?;

        let new_hash = hash_password(new_password)?;
        self.users.set_password_hash(user_id, &new_hash).await?;

        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
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

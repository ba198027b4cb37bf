//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] atlas_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] atlas_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("User not found")]
    UserNotFound,

    /// Username or email collides with an existing account. The message is
    /// caller-facing ("Username already exists", "Email already in use", ...).
    #[error("{0}")]
    Conflict(String),

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Current password did not match during a password reset.
    #[error("Current password is incorrect")]
    CurrentPasswordIncorrect,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

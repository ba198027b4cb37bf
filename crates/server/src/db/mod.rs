//! Database operations for the Atlas `SQLite` store.
//!
//! ## Tables
//!
//! - `users` - Accounts plus the embedded favorites / recently-viewed JSON
//!   aggregate columns
//! - `reviews` - Per-(user, country) notes and ratings
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and are embedded via
//! [`MIGRATOR`]; the server applies them at startup.

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub mod reviews;
pub mod users;

pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/server/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if it does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{MIGRATOR, SqlitePoolOptions};
    use sqlx::SqlitePool;

    /// Create a migrated in-memory database for tests.
    ///
    /// The pool is pinned to a single connection: every pooled connection to
    /// `sqlite::memory:` would otherwise open its own private database.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");

        MIGRATOR.run(&pool).await.expect("failed to run migrations");
        pool
    }
}

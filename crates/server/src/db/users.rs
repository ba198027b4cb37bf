//! User repository for database operations.
//!
//! Provides access to account rows and the embedded favorites /
//! recently-viewed JSON aggregate columns. Rows are converted into validated
//! domain types; malformed stored data surfaces as
//! [`RepositoryError::DataCorruption`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use atlas_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::{Favorite, RecentView, User};

/// Which identity field collides with an existing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityConflict {
    /// The username is already taken.
    Username,
    /// The email is already taken.
    Email,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let username = Username::parse(&self.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            username,
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored identity fields are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Find a user by username or email, returning their password hash.
    ///
    /// Either identifier may be absent; an absent identifier matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored identity fields are invalid.
    pub async fn find_with_password(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        // Identity fields are validated non-empty, so an empty-string bind
        // can never match a real row.
        let row = sqlx::query_as::<_, (i64, String, String, String, DateTime<Utc>, DateTime<Utc>)>(
            "SELECT id, username, email, password_hash, created_at, updated_at
             FROM users WHERE username = ? OR email = ?",
        )
        .bind(username.unwrap_or(""))
        .bind(email.unwrap_or(""))
        .fetch_optional(self.pool)
        .await?;

        let Some((id, username, email, password_hash, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let user = UserRow {
            id,
            username,
            email,
            created_at,
            updated_at,
        }
        .into_user()?;

        Ok(Some((user, password_hash)))
    }

    /// Check whether a username or email collides with another account.
    ///
    /// `exclude` skips the caller's own row during profile updates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_identity_conflict(
        &self,
        username: &Username,
        email: &Email,
        exclude: Option<UserId>,
    ) -> Result<Option<IdentityConflict>, RepositoryError> {
        let row = sqlx::query_as::<_, (String,)>(
            "SELECT username FROM users
             WHERE (username = ? OR email = ?) AND id != ?
             LIMIT 1",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(exclude.map_or(-1, |id| id.as_i64()))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(existing_username,)| {
            if existing_username == username.as_str() {
                IdentityConflict::Username
            } else {
                IdentityConflict::Email
            }
        }))
    }

    /// Create a new user with empty favorites and view history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, username, email, created_at, updated_at",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_user()
    }

    /// Update a user's username and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new identity collides.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_profile(
        &self,
        id: UserId,
        username: &Username,
        email: &Email,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET username = ?, email = ?, updated_at = ?
             WHERE id = ?
             RETURNING id, username, email, created_at, updated_at",
        )
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(Utc::now())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username or email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Get a user's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(hash)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load a user's favorites sequence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON is invalid.
    pub async fn favorites(&self, id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let raw = sqlx::query_scalar::<_, String>("SELECT favorites FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid favorites in database: {e}"))
        })
    }

    /// Persist a user's whole favorites sequence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_favorites(
        &self,
        id: UserId,
        favorites: &[Favorite],
    ) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(favorites).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to encode favorites: {e}"))
        })?;

        let result = sqlx::query("UPDATE users SET favorites = ?, updated_at = ? WHERE id = ?")
            .bind(raw)
            .bind(Utc::now())
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load a user's recently-viewed sequence (most-recent-first).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON is invalid.
    pub async fn recent_views(&self, id: UserId) -> Result<Vec<RecentView>, RepositoryError> {
        let raw = sqlx::query_scalar::<_, String>("SELECT recently_viewed FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        serde_json::from_str(&raw).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid recently_viewed in database: {e}"))
        })
    }

    /// Persist a user's whole recently-viewed sequence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_recent_views(
        &self,
        id: UserId,
        views: &[RecentView],
    ) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(views).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to encode recently_viewed: {e}"))
        })?;

        let result =
            sqlx::query("UPDATE users SET recently_viewed = ?, updated_at = ? WHERE id = ?")
                .bind(raw)
                .bind(Utc::now())
                .bind(id.as_i64())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

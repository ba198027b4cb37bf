//! Review repository for database operations.
//!
//! Notes and ratings live in the `reviews` table, one row per
//! (user, country) pair enforced by a unique index; note writes are upserts
//! against that row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use atlas_core::{CountryCode, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    country_code: String,
    rating: Option<i64>,
    review: Option<String>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Result<Review, RepositoryError> {
        let country_code = CountryCode::parse(&self.country_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid country code in database: {e}"))
        })?;

        Ok(Review {
            id: ReviewId::new(self.id),
            user_id: UserId::new(self.user_id),
            country_code,
            rating: self.rating,
            review: self.review,
            note: self.note,
            created_at: self.created_at,
        })
    }
}

const REVIEW_COLUMNS: &str = "id, user_id, country_code, rating, review, note, created_at";

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Set the note on the (user, country) review record, creating the
    /// record if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn upsert_note(
        &self,
        user_id: UserId,
        country_code: &CountryCode,
        note: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews (user_id, country_code, note, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (user_id, country_code) DO UPDATE SET note = excluded.note
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(country_code.as_str())
        .bind(note)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        row.into_review()
    }

    /// List a user's records that carry a non-empty note.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn notes(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews
             WHERE user_id = ? AND note IS NOT NULL AND note != ''
             ORDER BY id"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ReviewRow::into_review).collect()
    }

    /// Map of country code to stored rating for a user.
    ///
    /// Only codes with a rating appear in the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ratings(&self, user_id: UserId) -> Result<HashMap<String, i64>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT country_code, rating FROM reviews
             WHERE user_id = ? AND rating IS NOT NULL",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::UserRepository;
    use crate::db::test_support::memory_pool;
    use atlas_core::{Email, Username};

    async fn seed_user(pool: &SqlitePool) -> UserId {
        UserRepository::new(pool)
            .create(
                &Username::parse("alice").unwrap(),
                &Email::parse("a@x.com").unwrap(),
                "hash",
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_upsert_note_twice_keeps_one_record() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool).await;
        let repo = ReviewRepository::new(&pool);
        let code = CountryCode::parse("EE").unwrap();

        let first = repo.upsert_note(user_id, &code, "wonderful").await.unwrap();
        let second = repo.upsert_note(user_id, &code, "even better").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.note.as_deref(), Some("even better"));

        let notes = repo.notes(user_id).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].note.as_deref(), Some("even better"));
    }

    #[tokio::test]
    async fn test_notes_skips_records_without_note() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool).await;
        let repo = ReviewRepository::new(&pool);

        repo.upsert_note(user_id, &CountryCode::parse("EE").unwrap(), "tallinn")
            .await
            .unwrap();
        // A rating-only record has no note and must not appear in the listing.
        sqlx::query(
            "INSERT INTO reviews (user_id, country_code, rating, created_at)
             VALUES (?, 'NO', 4, ?)",
        )
        .bind(user_id.as_i64())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();

        let notes = repo.notes(user_id).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].country_code.as_str(), "EE");
    }

    #[tokio::test]
    async fn test_ratings_maps_codes_with_ratings_only() {
        let pool = memory_pool().await;
        let user_id = seed_user(&pool).await;
        let repo = ReviewRepository::new(&pool);

        sqlx::query(
            "INSERT INTO reviews (user_id, country_code, rating, created_at)
             VALUES (?, 'NO', 5, ?)",
        )
        .bind(user_id.as_i64())
        .bind(Utc::now())
        .execute(&pool)
        .await
        .unwrap();
        repo.upsert_note(user_id, &CountryCode::parse("EE").unwrap(), "no rating")
            .await
            .unwrap();

        let ratings = repo.ratings(user_id).await.unwrap();
        assert_eq!(ratings.get("NO"), Some(&5));
        assert!(!ratings.contains_key("EE"));
    }
}

//! User activity service: favorites, recently-viewed tracking, and notes.
//!
//! Each mutation loads the relevant sequence from the user's row, applies a
//! pure transformation that returns a new sequence, and persists the whole
//! aggregate column back. There is no cross-request locking; concurrent
//! mutations against the same user are last-write-wins.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use atlas_core::{CountryCode, UserId};

use crate::db::{RepositoryError, ReviewRepository, UserRepository};
use crate::models::{Favorite, RecentView, Review};
use crate::restcountries::CountriesClient;

/// Maximum number of entries kept in the recently-viewed sequence.
const RECENT_VIEW_LIMIT: usize = 10;

/// Errors that can occur during activity operations.
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The country is already in the favorites sequence.
    #[error("Country already in favorites")]
    DuplicateFavorite,

    /// A note upsert was missing its country code or text.
    #[error("Country code and note are required")]
    MissingNoteFields,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One entry of the enriched recently-viewed listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewedEntry {
    /// Code of the viewed country.
    pub country_code: CountryCode,
    /// When the country was last viewed.
    pub viewed_at: DateTime<Utc>,
    /// The caller's stored rating for this country, if any.
    pub rating: Option<i64>,
    /// Display name resolved via the gateway, if the code resolved.
    pub name: Option<String>,
    /// Flag image URL resolved via the gateway, if the code resolved.
    pub flag: Option<String>,
    /// Region resolved via the gateway, if the code resolved.
    pub region: Option<String>,
}

/// Service for the per-user activity aggregate.
pub struct ActivityService<'a> {
    users: UserRepository<'a>,
    reviews: ReviewRepository<'a>,
}

impl<'a> ActivityService<'a> {
    /// Create a new activity service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            reviews: ReviewRepository::new(pool),
        }
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// The user's favorites sequence, insertion order.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Repository` if the load fails.
    pub async fn favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, ActivityError> {
        Ok(self.users.favorites(user_id).await?)
    }

    /// Append a favorite, rejecting duplicates by country code.
    ///
    /// Returns the full updated sequence.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::DuplicateFavorite` if the code is already present.
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        favorite: Favorite,
    ) -> Result<Vec<Favorite>, ActivityError> {
        let favorites = self.users.favorites(user_id).await?;

        let updated =
            with_favorite(&favorites, favorite).ok_or(ActivityError::DuplicateFavorite)?;
        self.users.set_favorites(user_id, &updated).await?;

        Ok(updated)
    }

    /// Remove all favorites matching a code. Removing an absent code is a
    /// no-op that still returns the (unchanged) sequence.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Repository` if the load or store fails.
    pub async fn remove_favorite(
        &self,
        user_id: UserId,
        code: &CountryCode,
    ) -> Result<Vec<Favorite>, ActivityError> {
        let favorites = self.users.favorites(user_id).await?;

        let updated = without_favorite(&favorites, code);
        self.users.set_favorites(user_id, &updated).await?;

        Ok(updated)
    }

    // =========================================================================
    // Recently viewed
    // =========================================================================

    /// Record a view of a country: move-to-front with a fresh timestamp,
    /// dropping the oldest entry beyond the limit.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Repository` if the load or store fails.
    pub async fn record_view(
        &self,
        user_id: UserId,
        code: CountryCode,
    ) -> Result<(), ActivityError> {
        let views = self.users.recent_views(user_id).await?;

        let updated = with_view(&views, code, Utc::now());
        self.users.set_recent_views(user_id, &updated).await?;

        Ok(())
    }

    /// The user's recently-viewed listing, most-recent-first, enriched with
    /// display data from one batch gateway call and the user's stored
    /// ratings.
    ///
    /// Enrichment is best-effort: a failed gateway or ratings lookup leaves
    /// the affected fields empty instead of failing the listing.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Repository` if the stored sequence cannot be
    /// loaded.
    pub async fn recently_viewed(
        &self,
        user_id: UserId,
        countries: &CountriesClient,
    ) -> Result<Vec<RecentlyViewedEntry>, ActivityError> {
        let views = self.users.recent_views(user_id).await?;
        if views.is_empty() {
            return Ok(Vec::new());
        }

        let codes: Vec<CountryCode> = views.iter().map(|v| v.country_code.clone()).collect();
        let resolved = match countries.by_codes(&codes).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to resolve recently viewed countries");
                Vec::new()
            }
        };

        let ratings = match self.reviews.ratings(user_id).await {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "failed to load ratings for recently viewed countries");
                HashMap::new()
            }
        };

        Ok(views
            .into_iter()
            .map(|view| {
                let country = resolved.iter().find(|c| c.matches_code(&view.country_code));
                RecentlyViewedEntry {
                    rating: ratings.get(view.country_code.as_str()).copied(),
                    name: country.map(|c| c.name.common.clone()),
                    flag: country.and_then(|c| c.flags.png.clone()),
                    region: country.and_then(|c| c.region.clone()),
                    country_code: view.country_code,
                    viewed_at: view.viewed_at,
                }
            })
            .collect())
    }

    // =========================================================================
    // Notes
    // =========================================================================

    /// Create or overwrite the user's note for a country.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::MissingNoteFields` if the note text is empty.
    pub async fn upsert_note(
        &self,
        user_id: UserId,
        code: &CountryCode,
        note: &str,
    ) -> Result<Review, ActivityError> {
        if note.is_empty() {
            return Err(ActivityError::MissingNoteFields);
        }

        Ok(self.reviews.upsert_note(user_id, code, note).await?)
    }

    /// The user's notes, projected from records with non-empty note text.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Repository` if the query fails.
    pub async fn notes(&self, user_id: UserId) -> Result<Vec<Review>, ActivityError> {
        Ok(self.reviews.notes(user_id).await?)
    }
}

// =============================================================================
// Pure sequence transformations
// =============================================================================

/// Append `favorite` unless its code is already present.
///
/// Returns `None` on a duplicate so the caller can reject without touching
/// the stored sequence.
fn with_favorite(favorites: &[Favorite], favorite: Favorite) -> Option<Vec<Favorite>> {
    if favorites.iter().any(|f| f.code == favorite.code) {
        return None;
    }

    let mut updated = favorites.to_vec();
    updated.push(favorite);
    Some(updated)
}

/// The sequence without any entry matching `code`.
fn without_favorite(favorites: &[Favorite], code: &CountryCode) -> Vec<Favorite> {
    favorites
        .iter()
        .filter(|f| &f.code != code)
        .cloned()
        .collect()
}

/// The view sequence with `code` moved to the front at `viewed_at`,
/// truncated to the most recent [`RECENT_VIEW_LIMIT`] entries.
fn with_view(views: &[RecentView], code: CountryCode, viewed_at: DateTime<Utc>) -> Vec<RecentView> {
    let mut updated = Vec::with_capacity(views.len() + 1);
    updated.push(RecentView {
        country_code: code.clone(),
        viewed_at,
    });
    updated.extend(views.iter().filter(|v| v.country_code != code).cloned());
    updated.truncate(RECENT_VIEW_LIMIT);
    updated
}

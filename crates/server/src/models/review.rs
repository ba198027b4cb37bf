//! Review domain types.

use chrono::{DateTime, Utc};

use atlas_core::{CountryCode, ReviewId, UserId};

/// A per-(user, country) review record (domain type).
///
/// Holds the free-text note plus the optional rating and review text carried
/// over from the original data model. At most one record exists per
/// (user, country) pair; note writes are upserts against that record.
#[derive(Debug, Clone)]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// User who owns this record.
    pub user_id: UserId,
    /// Country the record is about.
    pub country_code: CountryCode,
    /// Optional star rating (1-5).
    pub rating: Option<i64>,
    /// Optional public review text.
    pub review: Option<String>,
    /// Optional personal note.
    pub note: Option<String>,
    /// When the record was first created.
    pub created_at: DateTime<Utc>,
}

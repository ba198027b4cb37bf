//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, Email, UserId, Username};

/// An Atlas user (domain type).
///
/// The favorites and recently-viewed sequences embedded in the same row are
/// loaded separately by the repository; this type carries identity only.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique account username.
    pub username: Username,
    /// Unique email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller, resolved from a verified bearer token.
///
/// Passed explicitly into every operation that acts on a user's data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    /// ID of the authenticated user.
    pub id: UserId,
}

/// One entry of a user's favorites sequence.
///
/// Serialized verbatim into the `favorites` JSON column and into API
/// responses, so the field names are part of the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Country code, unique within the sequence.
    pub code: CountryCode,
    /// Display name captured at the time the favorite was added.
    pub name: String,
    /// Flag image URL captured at the time the favorite was added.
    pub flag: String,
}

/// One entry of a user's recently-viewed sequence.
///
/// Stored most-recent-first; serialized verbatim into the `recently_viewed`
/// JSON column and into API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentView {
    /// Code of the viewed country.
    pub country_code: CountryCode,
    /// When the country was last viewed.
    pub viewed_at: DateTime<Utc>,
}

//! User activity route handlers: view history, profile, password, notes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atlas_core::{CountryCode, ReviewId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Review;
use crate::routes::auth::UserBody;
use crate::services::{ActivityService, AuthService, RecentlyViewedEntry};
use crate::state::AppState;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recently-viewed", get(recently_viewed))
        .route("/profile", put(update_profile))
        .route("/reset-password", put(reset_password))
        .route("/note", post(upsert_note))
        .route("/notes", get(list_notes))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body for profile updates.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub username: String,
    pub email: String,
}

/// Response for profile updates.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserBody,
}

/// Body for password resets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Response for password resets.
#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Body for note upserts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub note: String,
}

/// A review record as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub id: ReviewId,
    pub country_code: CountryCode,
    pub rating: Option<i64>,
    pub review: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewBody {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            country_code: review.country_code,
            rating: review.rating,
            review: review.review,
            note: review.note,
            created_at: review.created_at,
        }
    }
}

/// Response for note upserts.
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub message: &'static str,
    pub review: ReviewBody,
}

/// One entry of the notes listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBody {
    pub country_code: CountryCode,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Handlers
// =============================================================================

/// The caller's view history, most-recent-first, enriched with display data
/// and stored ratings.
async fn recently_viewed(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<RecentlyViewedEntry>>> {
    let activity = ActivityService::new(state.pool());
    let entries = activity
        .recently_viewed(current.id, state.countries())
        .await?;

    Ok(Json(entries))
}

/// Update the caller's username and email.
///
/// # Errors
///
/// Returns 400 if either field is already in use by another account.
async fn update_profile(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .update_profile(current.id, &body.username, &body.email)
        .await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

/// Change the caller's password after verifying the current one.
///
/// # Errors
///
/// Returns 401 if the current password is wrong, 400 if the new password is
/// shorter than 6 characters.
async fn reset_password(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>> {
    let auth = AuthService::new(state.pool());
    auth.reset_password(current.id, &body.current_password, &body.new_password)
        .await?;

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "Password updated successfully",
    }))
}

/// Create or overwrite the caller's note for a country.
///
/// # Errors
///
/// Returns 400 if the country code or note text is missing.
async fn upsert_note(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<NoteRequest>,
) -> Result<Json<NoteResponse>> {
    if body.country_code.is_empty() || body.note.is_empty() {
        return Err(AppError::Validation(
            "Country code and note are required".to_owned(),
        ));
    }

    let code =
        CountryCode::parse(&body.country_code).map_err(|e| AppError::Validation(e.to_string()))?;

    let activity = ActivityService::new(state.pool());
    let review = activity.upsert_note(current.id, &code, &body.note).await?;

    Ok(Json(NoteResponse {
        message: "Note saved successfully",
        review: review.into(),
    }))
}

/// The caller's notes, projected to code, text, and creation time.
async fn list_notes(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<NoteBody>>> {
    let activity = ActivityService::new(state.pool());
    let notes = activity.notes(current.id).await?;

    Ok(Json(
        notes
            .into_iter()
            .filter_map(|review| {
                let Review {
                    country_code,
                    note,
                    created_at,
                    ..
                } = review;
                note.map(|note| NoteBody {
                    country_code,
                    note,
                    created_at,
                })
            })
            .collect(),
    ))
}

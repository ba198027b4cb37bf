//! Favorites route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use atlas_core::CountryCode;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Favorite;
use crate::services::ActivityService;
use crate::state::AppState;

/// Build the favorites router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites).post(add_favorite))
        .route("/{code}", axum::routing::delete(remove_favorite))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body for adding a favorite.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flag: String,
}

/// Response for favorite mutations.
#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub message: &'static str,
    pub favorites: Vec<Favorite>,
}

// =============================================================================
// Handlers
// =============================================================================

/// The caller's favorites, insertion order.
async fn list_favorites(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Favorite>>> {
    let activity = ActivityService::new(state.pool());
    Ok(Json(activity.favorites(current.id).await?))
}

/// Add a country to the caller's favorites.
///
/// # Errors
///
/// Returns 400 "Country already in favorites" on a duplicate code.
async fn add_favorite(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddFavoriteRequest>,
) -> Result<Json<FavoritesResponse>> {
    let code = CountryCode::parse(&body.code).map_err(|e| AppError::Validation(e.to_string()))?;

    let activity = ActivityService::new(state.pool());
    let favorites = activity
        .add_favorite(
            current.id,
            Favorite {
                code,
                name: body.name,
                flag: body.flag,
            },
        )
        .await?;

    Ok(Json(FavoritesResponse {
        message: "Added to favorites",
        favorites,
    }))
}

/// Remove a country from the caller's favorites. Removing an absent code
/// succeeds with no change.
async fn remove_favorite(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<FavoritesResponse>> {
    let code = CountryCode::parse(&code).map_err(|e| AppError::Validation(e.to_string()))?;

    let activity = ActivityService::new(state.pool());
    let favorites = activity.remove_favorite(current.id, &code).await?;

    Ok(Json(FavoritesResponse {
        message: "Removed from favorites",
        favorites,
    }))
}

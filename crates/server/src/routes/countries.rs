//! Country lookup route handlers.
//!
//! Every handler forwards to the country gateway and passes the upstream
//! payload through. The single-country code lookup additionally records a
//! recently-viewed entry for the caller, best-effort.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use atlas_core::CountryCode;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::restcountries::Country;
use crate::services::ActivityService;
use crate::state::AppState;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_PAGE_LIMIT: usize = 5;

/// Build the countries router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all", get(all_countries))
        .route("/name/{name}", get(by_name))
        .route("/region/{region}", get(by_region))
        .route("/language/{language}", get(by_language))
        .route("/code/{code}", get(by_code))
        .route("/codes", get(by_codes))
        .route("/currency/{currency}", get(by_currency))
        .route("/demonym/{demonym}", get(by_demonym))
        .route("/capital/{capital}", get(by_capital))
        .route("/subregion/{subregion}", get(by_subregion))
        .route("/translation/{translation}", get(by_translation))
}

// =============================================================================
// Query Types
// =============================================================================

/// Pagination parameters for the full listing.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Batch-lookup parameters.
#[derive(Debug, Deserialize)]
pub struct CodesQuery {
    pub codes: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// All independent countries, paginated in-process.
async fn all_countries(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Vec<Country>>> {
    let countries = state.countries().all_independent().await?;

    Ok(Json(paginate(
        countries,
        params.page.unwrap_or(DEFAULT_PAGE),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    )))
}

/// Countries matching a name.
async fn by_name(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_name(&name).await?))
}

/// Countries in a region.
async fn by_region(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_region(&region).await?))
}

/// Countries speaking a language.
async fn by_language(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_language(&language).await?))
}

/// A single country by code. A successful lookup records a recently-viewed
/// entry for the caller; a failure there is logged and never fails the
/// lookup itself.
async fn by_code(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Country>> {
    let code = CountryCode::parse(&code).map_err(|e| AppError::Validation(e.to_string()))?;

    let country = state.countries().by_code(&code).await?;

    let activity = ActivityService::new(state.pool());
    if let Err(err) = activity.record_view(current.id, code.clone()).await {
        tracing::warn!(user_id = %current.id, code = %code, error = %err, "failed to record country view");
    }

    Ok(Json(country))
}

/// A batch of countries by comma-separated codes.
async fn by_codes(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<CodesQuery>,
) -> Result<Json<Vec<Country>>> {
    let raw = params
        .codes
        .filter(|codes| !codes.is_empty())
        .ok_or_else(|| AppError::Validation("Query parameter 'codes' is required".to_owned()))?;

    let codes = raw
        .split(',')
        .map(|part| CountryCode::parse(part.trim()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(state.countries().by_codes(&codes).await?))
}

/// Countries using a currency.
async fn by_currency(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(currency): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_currency(&currency).await?))
}

/// Countries whose citizens are called by a demonym.
async fn by_demonym(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(demonym): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_demonym(&demonym).await?))
}

/// Countries with a capital city.
async fn by_capital(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(capital): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_capital(&capital).await?))
}

/// Countries in a subregion.
async fn by_subregion(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(subregion): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_subregion(&subregion).await?))
}

/// Countries matching a translated name.
async fn by_translation(
    RequireAuth(_current): RequireAuth,
    State(state): State<AppState>,
    Path(translation): Path<String>,
) -> Result<Json<Vec<Country>>> {
    Ok(Json(state.countries().by_translation(&translation).await?))
}

// =============================================================================
// Pagination
// =============================================================================

/// Slice out one 1-indexed page. Zero values fall back to the defaults.
fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Vec<T> {
    let page = if page == 0 { DEFAULT_PAGE } else { page };
    let limit = if limit == 0 { DEFAULT_PAGE_LIMIT } else { limit };

    items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect()
}

//! HTTP route handlers for the Atlas API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (probes database)
//!
//! # Auth
//! POST /auth/register                   - Create an account, returns token
//! POST /auth/login                      - Login by username or email
//! POST /auth/logout                     - Stateless logout acknowledgment
//! GET  /auth/me                         - Current identity (requires auth)
//!
//! # Countries (all require auth; pass-through to the country provider)
//! GET  /countries/all?page&limit        - Paginated listing
//! GET  /countries/name/{name}           - Lookup by name
//! GET  /countries/region/{region}       - Lookup by region
//! GET  /countries/language/{language}   - Lookup by language
//! GET  /countries/code/{code}           - Single country; records a recent view
//! GET  /countries/codes?codes=a,b,c     - Batch lookup by codes
//! GET  /countries/currency/{currency}   - Lookup by currency
//! GET  /countries/demonym/{demonym}     - Lookup by demonym
//! GET  /countries/capital/{capital}     - Lookup by capital
//! GET  /countries/subregion/{subregion} - Lookup by subregion
//! GET  /countries/translation/{name}    - Lookup by translated name
//!
//! # Favorites (require auth)
//! GET    /favorites                     - Stored sequence
//! POST   /favorites                     - Add {code, name, flag}
//! DELETE /favorites/{code}              - Idempotent removal
//!
//! # User activity (require auth)
//! GET  /users/recently-viewed           - Enriched view history
//! PUT  /users/profile                   - Update username/email
//! PUT  /users/reset-password            - Change password
//! POST /users/note                      - Upsert a country note
//! GET  /users/notes                     - List notes
//! ```

pub mod auth;
pub mod countries;
pub mod favorites;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the API router with all route groups.
#[must_use]
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/countries", countries::router())
        .nest("/favorites", favorites::router())
        .nest("/users", users::router())
}

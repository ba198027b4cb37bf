//! Authentication route handlers.
//!
//! Registration and login mint a bearer token; logout is a stateless
//! acknowledgment since the client holds the token.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use atlas_core::{Email, UserId, Username};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body. Either identifier may be supplied.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Serialize)]
pub struct UserBody {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
}

impl From<User> for UserBody {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// Response for register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserBody,
}

/// Response for logout.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account and mint its first token.
///
/// # Errors
///
/// Returns 400 for validation failures and duplicate username/email.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.username, &body.email, &body.password)
        .await?;

    let token = state
        .tokens()
        .issue(user.id)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// Login by username or email.
///
/// # Errors
///
/// Returns 400 if neither identifier is present, 401 for bad credentials.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    if body.username.is_none() && body.email.is_none() {
        return Err(AppError::Validation(
            "Username or email is required".to_owned(),
        ));
    }

    let auth = AuthService::new(state.pool());
    let user = auth
        .login(body.username.as_deref(), body.email.as_deref(), &body.password)
        .await?;

    let token = state
        .tokens()
        .issue(user.id)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Acknowledge logout. The token lives client-side, so there is nothing to
/// revoke server-side.
async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        success: true,
        message: "Logged out successfully",
    })
}

/// Current authenticated identity.
///
/// # Errors
///
/// Returns 404 if the token names a user that no longer exists.
async fn me(RequireAuth(current): RequireAuth, State(state): State<AppState>) -> Result<Json<UserBody>> {
    let auth = AuthService::new(state.pool());
    let user = auth.get_user(current.id).await?;

    Ok(Json(user.into()))
}

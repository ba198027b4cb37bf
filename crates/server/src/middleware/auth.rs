//! Authentication middleware and extractors.
//!
//! Provides the extractor that requires a valid bearer token in route
//! handlers and resolves it to the calling user's identity.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::CurrentUser;
use crate::services::auth::TokenError;
use crate::state::AppState;

/// Extractor that requires bearer-token authentication.
///
/// Verifies the `Authorization: Bearer <token>` header and yields the
/// identity it names. Requests without a valid, unexpired token are
/// rejected with 401 before the handler runs.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but missing or invalid.
pub enum AuthRejection {
    /// No usable `Authorization: Bearer` header on the request.
    MissingCredentials,
    /// The token failed verification.
    InvalidToken,
    /// The token has expired.
    ExpiredToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MissingCredentials => "Missing authorization token",
            Self::InvalidToken => "Invalid authorization token",
            Self::ExpiredToken => "Authorization token expired",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthRejection::MissingCredentials)?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or(AuthRejection::MissingCredentials)?;

        let user_id = state.tokens().verify(token).map_err(|e| match e {
            TokenError::Expired => AuthRejection::ExpiredToken,
            TokenError::Invalid => AuthRejection::InvalidToken,
        })?;

        Ok(Self(CurrentUser { id: user_id }))
    }
}

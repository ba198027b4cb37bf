//! Unified error handling for the API surface.
//!
//! Provides a unified `AppError` type translating every layer's errors into
//! an HTTP status plus a JSON `{"error": "..."}` body. All route handlers
//! return `Result<T, AppError>`; nothing crashes the process.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::restcountries::CountriesError;
use crate::services::{ActivityError, AuthError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Country gateway operation failed.
    #[error("Country service error: {0}")]
    Countries(#[from] CountriesError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Activity (favorites / views / notes) operation failed.
    #[error("Activity error: {0}")]
    Activity(#[from] ActivityError),

    /// Request failed validation before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned to clients.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Countries(CountriesError::Upstream { .. } | CountriesError::Http(_))
        ) {
            tracing::error!(error = %self, "Request error");
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Countries(err) => match err {
                CountriesError::NotFound(_) => StatusCode::NOT_FOUND,
                CountriesError::Upstream { .. } | CountriesError::Http(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::CurrentPasswordIncorrect => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UserNotFound => StatusCode::NOT_FOUND,
                // Duplicate username/email scenarios are contracted as 400s.
                AuthError::Conflict(_)
                | AuthError::WeakPassword(_)
                | AuthError::InvalidUsername(_)
                | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Activity(err) => match err {
                ActivityError::DuplicateFavorite | ActivityError::MissingNoteFields => {
                    StatusCode::BAD_REQUEST
                }
                ActivityError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Redact database internals; attach upstream gateway messages
        // (internal-tool policy).
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Countries(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
                other => other.to_string(),
            },
            Self::Activity(err) => match err {
                ActivityError::Repository(_) => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::Validation(msg) | Self::NotFound(msg) | Self::Unauthorized(msg) => msg.clone(),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("country EE".to_string());
        assert_eq!(err.to_string(), "Not found: country EE");

        let err = AppError::Validation("missing code".to_string());
        assert_eq!(err.to_string(), "Validation error: missing code");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Validation("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_duplicate_scenarios_map_to_bad_request() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::Conflict(
                "Username already exists".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Activity(ActivityError::DuplicateFavorite)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_gateway_errors_distinguish_not_found() {
        assert_eq!(
            get_status(AppError::Countries(CountriesError::NotFound(
                "Country not found".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Countries(CountriesError::Upstream {
                status: 500,
                message: "boom".to_string(),
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_database_errors_are_redacted() {
        let err = AppError::Database(RepositoryError::DataCorruption("secret detail".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

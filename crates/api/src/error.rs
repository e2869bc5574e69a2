//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps every failure onto the
//! `{status, message, data}` envelope with a precise HTTP status code,
//! capturing server-side errors to Sentry before responding. Route handlers
//! return `Result<ApiResponse, AppError>`.
//!
//! Unlike a blanket catch-all, each variant carries exactly one outcome:
//! validation problems are 400, authentication failures 401, missing
//! resources 404, and only genuinely unexpected errors become 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::response::Envelope;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness rule was violated (duplicate email, existing address).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A signed token failed verification (400-class flows).
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// A signed token has expired (400-class flows).
    #[error("expired token: {0}")]
    TokenExpired(String),

    /// Authentication operation failed.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Caller identity missing or not acceptable.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Email delivery failed.
    #[error("email error: {0}")]
    Email(#[from] EmailError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::TokenInvalid(_)
            | Self::TokenExpired(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::AccountDisabled
                | AuthError::EmailUnverified => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists
                | AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The client-facing `message` field. Internal details stay out of it.
    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Conflict(msg) | Self::TokenInvalid(msg)
            | Self::TokenExpired(msg) | Self::Unauthorized(msg) | Self::NotFound(msg) => {
                msg.clone()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Username/Password Mismatch".to_owned(),
                AuthError::AccountDisabled => "Account disabled, please contact admin".to_owned(),
                AuthError::EmailUnverified => {
                    "Email has not yet been verified, please verify your email in order to login"
                        .to_owned()
                }
                AuthError::UserAlreadyExists => "User with this email already exists".to_owned(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Email(_)
                | Self::Internal(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status_code();
        let body = Envelope::failed(self.client_message());

        (status, axum::Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_validation_class_is_400() {
        assert_eq!(
            status_of(AppError::Validation("Invalid quantity".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Conflict("Address already exists".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::TokenExpired("Activation link has expired".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_failures_are_401() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::EmailUnverified)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Auth(AuthError::AccountDisabled)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Unauthorized("Unauthorized".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_duplicate_email_is_400() {
        assert_eq!(
            status_of(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_not_found_is_404() {
        assert_eq!(
            status_of(AppError::NotFound("Product not found".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_unexpected_errors_are_500_not_401() {
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

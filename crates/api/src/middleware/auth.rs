//! Authentication extractors.
//!
//! Identity is carried as a Bearer access token. `RequireAuth` resolves it
//! to a [`User`] row or rejects with the uniform `Unauthorized` envelope;
//! `OptionalAuth` yields `None` instead of rejecting, for endpoints that
//! accept both authenticated and anonymous callers.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};

use crate::db::users::UserRepository;
use crate::models::User;
use crate::response::Envelope;
use crate::services::token::TokenPurpose;
use crate::state::AppState;

/// Extractor that requires an authenticated, active user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Rejection returned when the caller's identity cannot be resolved.
///
/// Deliberately carries no detail: a missing header, a bad signature and an
/// unknown user all look the same to the caller.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(Envelope::failed("Unauthorized")),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_user(parts, state).await.ok_or(AuthRejection)?;
        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike `RequireAuth`, this does not reject the request when no valid
/// identity is presented.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(parts, state).await))
    }
}

/// Resolve the Bearer token in `parts` to an active user, if possible.
async fn resolve_user(parts: &Parts, state: &AppState) -> Option<User> {
    let token = bearer_token(parts)?;

    let claims = state.tokens().verify(token, TokenPurpose::Access).ok()?;

    let user = UserRepository::new(state.pool())
        .get_by_id(claims.user_id())
        .await
        .ok()
        .flatten()?;

    if !user.is_active {
        return None;
    }

    Some(user)
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

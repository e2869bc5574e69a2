//! Authentication route handlers.
//!
//! Registration, login/logout, email verification, token refresh, and the
//! password-reset flow. Every response uses the uniform envelope.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use mangrove_core::Email;

use crate::db::tokens::RefreshTokenRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::services::auth::{AuthService, Registration};
use crate::services::token::{self, TokenError, TokenPurpose};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload carrying a refresh token (logout, refresh).
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Payload asking for a (re-)verification or reset email.
#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Email-verification query parameter.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// Password-reset completion payload.
#[derive(Debug, Deserialize)]
pub struct ResetCompleteRequest {
    pub password: String,
    pub uidb64: String,
    pub token: String,
}

// =============================================================================
// Registration & Verification
// =============================================================================

/// `POST /auth/register` - create an account and send the verification link.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ApiResponse> {
    let auth = AuthService::new(state.pool());

    let user = auth
        .register(&Registration {
            email: &payload.email,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            phone: &payload.phone,
            password: &payload.password,
        })
        .await?;

    send_verification_email(&state, &user.email, &user.first_name, user.id).await;

    Ok(ApiResponse::created(
        "User registration successful",
        json!({
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
            "phone": user.phone,
        }),
    ))
}

/// `GET /auth/email/verify?token=` - flip `is_verified` once.
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<ApiResponse> {
    let claims = state
        .tokens()
        .verify(&query.token, TokenPurpose::Verify)
        .map_err(|e| match e {
            TokenError::Expired => AppError::TokenExpired(
                "Activation link has expired, please request for a new link".to_owned(),
            ),
            _ => AppError::TokenInvalid("Invalid token".to_owned()),
        })?;

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(claims.user_id())
        .await?
        .ok_or_else(|| AppError::TokenInvalid("Invalid token".to_owned()))?;

    if !user.is_verified {
        users.mark_verified(user.id).await?;
    }

    Ok(ApiResponse::success(
        "Email has been successfully verified",
        json!({ "email": user.email }),
    ))
}

/// `POST /auth/request-verification-link` - re-send the verification email.
///
/// The response is uniform whether or not the email is known.
pub async fn request_verification_link(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<ApiResponse> {
    let email = Email::parse(&payload.email)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let users = UserRepository::new(state.pool());
    if let Some(user) = users.get_by_email(&email).await?
        && !user.is_verified
    {
        send_verification_email(&state, &user.email, &user.first_name, user.id).await;
    }

    Ok(ApiResponse::success(
        "Verification link sent to your mail",
        json!([]),
    ))
}

// =============================================================================
// Login / Logout / Refresh
// =============================================================================

/// `POST /auth/login` - verify credentials and issue a token pair.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ApiResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&payload.email, &payload.password).await?;

    let issued = state
        .tokens()
        .issue_pair(user.id)
        .map_err(|_| AppError::Internal("token issuance failed".to_owned()))?;

    RefreshTokenRepository::new(state.pool())
        .insert(issued.refresh_jti, user.id, issued.refresh_expires_at)
        .await?;

    Ok(ApiResponse::success(
        "Login successful",
        json!({
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
            "phone": user.phone,
            "tokens": issued.tokens,
        }),
    ))
}

/// `POST /auth/logout` - revoke the presented refresh token.
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse> {
    let claims = state
        .tokens()
        .verify(&payload.refresh, TokenPurpose::Refresh)
        .map_err(|_| AppError::TokenInvalid("Token is expired or invalid".to_owned()))?;

    let jti = claims
        .jti
        .ok_or_else(|| AppError::TokenInvalid("Token is expired or invalid".to_owned()))?;

    let revoked = RefreshTokenRepository::new(state.pool()).revoke(jti).await?;
    if !revoked {
        return Err(AppError::TokenInvalid(
            "Token is expired or invalid".to_owned(),
        ));
    }

    Ok(ApiResponse::no_content())
}

/// `POST /auth/token/refresh` - mint a new access token.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<ApiResponse> {
    let invalid = || AppError::Unauthorized("Token is expired or invalid".to_owned());

    let claims = state
        .tokens()
        .verify(&payload.refresh, TokenPurpose::Refresh)
        .map_err(|_| invalid())?;

    let jti = claims.jti.ok_or_else(invalid)?;
    if !RefreshTokenRepository::new(state.pool()).is_active(jti).await? {
        return Err(invalid());
    }

    let access_token = state
        .tokens()
        .issue_access(claims.user_id())
        .map_err(|_| AppError::Internal("token issuance failed".to_owned()))?;

    Ok(ApiResponse::success(
        "Token refreshed",
        json!({ "access_token": access_token }),
    ))
}

// =============================================================================
// Password Reset
// =============================================================================

/// `POST /auth/request-reset-email` - send a reset link if the email is known.
///
/// The response is uniform either way, so callers cannot probe for accounts.
pub async fn request_reset_email(
    State(state): State<AppState>,
    Json(payload): Json<EmailRequest>,
) -> Result<ApiResponse> {
    let email = Email::parse(&payload.email)
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let users = UserRepository::new(state.pool());
    if let Some(user) = users.get_by_email(&email).await? {
        let password_hash = users.password_hash(user.id).await?;
        let token = state
            .tokens()
            .issue_reset(user.id, &password_hash)
            .map_err(|_| AppError::Internal("token issuance failed".to_owned()))?;
        let uidb64 = token::encode_uid(user.id);

        let link = format!(
            "{}/auth/password-reset/{uidb64}/{token}",
            state.config().base_url
        );

        if let Err(e) = state
            .mailer()
            .send_reset_link(&user.email, &user.first_name, &link)
            .await
        {
            tracing::warn!(error = %e, "Failed to send password reset email");
        }
    }

    Ok(ApiResponse::success(
        "Password Reset Link Sent To Your Mail",
        json!([]),
    ))
}

/// `GET /auth/password-reset/{uidb64}/{token}` - check reset credentials.
pub async fn check_reset_token(
    State(state): State<AppState>,
    Path((uidb64, token)): Path<(String, String)>,
) -> Result<ApiResponse> {
    let stale = || {
        AppError::Unauthorized(
            "Password reset token no longer valid, please request a new one.".to_owned(),
        )
    };

    let user_id = token::decode_uid(&uidb64).ok_or_else(stale)?;

    let users = UserRepository::new(state.pool());
    let password_hash = users
        .password_hash(user_id)
        .await
        .map_err(|_| stale())?;

    state
        .tokens()
        .verify_reset(&token, &password_hash)
        .map_err(|_| stale())?;

    Ok(ApiResponse::success(
        "Password Reset Credentials Valid",
        json!({ "uidb64": uidb64, "token": token }),
    ))
}

/// `PATCH /auth/password-reset-complete` - set the new password.
pub async fn reset_password_complete(
    State(state): State<AppState>,
    Json(payload): Json<ResetCompleteRequest>,
) -> Result<ApiResponse> {
    let invalid = || AppError::Unauthorized("Invalid UID or Token".to_owned());

    let user_id = token::decode_uid(&payload.uidb64).ok_or_else(invalid)?;

    let users = UserRepository::new(state.pool());
    let password_hash = users
        .password_hash(user_id)
        .await
        .map_err(|_| invalid())?;

    state
        .tokens()
        .verify_reset(&payload.token, &password_hash)
        .map_err(|_| invalid())?;

    AuthService::new(state.pool())
        .set_password(user_id, &payload.password)
        .await?;

    Ok(ApiResponse::success("Password Reset Successful", json!([])))
}

// =============================================================================
// Helpers
// =============================================================================

/// Build and send the verification link; delivery problems are logged, not
/// surfaced, so registration itself never fails on a mail hiccup.
async fn send_verification_email(
    state: &AppState,
    email: &Email,
    first_name: &str,
    user_id: mangrove_core::UserId,
) {
    let token = match state.tokens().issue_verification(user_id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue verification token");
            return;
        }
    };

    let link = format!(
        "{}/auth/email/verify?token={token}",
        state.config().base_url
    );

    if let Err(e) = state
        .mailer()
        .send_verification_link(email, first_name, &link)
        .await
    {
        tracing::warn!(error = %e, "Failed to send verification email");
    }
}

//! Signed-token service.
//!
//! Issues and verifies the four HS256 token kinds the API uses: access and
//! refresh tokens for sessions, plus single-purpose email-verification and
//! password-reset tokens. Signature and expiry checking are delegated to
//! `jsonwebtoken`; this module only decides what goes into the claims.
//!
//! Reset tokens additionally carry a fingerprint of the password hash they
//! were issued against, so a completed reset (or any password change)
//! invalidates outstanding reset links without server-side bookkeeping.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use mangrove_core::UserId;

use crate::config::TokenConfig;

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    Verify,
    Reset,
}

/// Claims carried by every Mangrove token.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id (subject).
    pub sub: i32,
    /// Purpose discriminator; verification rejects mismatches.
    pub purpose: TokenPurpose,
    /// Token id; present on refresh tokens so they can be revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
    /// Password-hash fingerprint; present on reset tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fpt: Option<String>,
    /// Issued-at timestamp.
    pub iat: i64,
    /// Expiry timestamp.
    pub exp: i64,
}

impl Claims {
    /// The user this token was issued to.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Errors from token issuance or verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token's signature is valid but it has expired.
    #[error("token has expired")]
    Expired,

    /// Malformed, tampered, wrong-purpose, or otherwise unusable token.
    #[error("token is invalid")]
    Invalid,

    /// Token could not be signed.
    #[error("token generation failed")]
    Generation,
}

/// The `{refresh, access_token}` pair returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access_token: String,
}

/// A freshly issued pair plus the bookkeeping the caller must persist.
#[derive(Debug)]
pub struct IssuedPair {
    pub tokens: TokenPair,
    pub refresh_jti: Uuid,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and verifies signed tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    verify_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            verify_ttl: Duration::hours(config.verify_ttl_hours),
            reset_ttl: Duration::minutes(config.reset_ttl_minutes),
        }
    }

    /// Issue an access token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_access(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Access, self.access_ttl, None, None)
    }

    /// Issue a refresh + access pair for a successful login.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_pair(&self, user_id: UserId) -> Result<IssuedPair, TokenError> {
        let jti = Uuid::new_v4();
        let refresh_expires_at = Utc::now() + self.refresh_ttl;

        let refresh = self.issue(
            user_id,
            TokenPurpose::Refresh,
            self.refresh_ttl,
            Some(jti),
            None,
        )?;
        let access_token = self.issue_access(user_id)?;

        Ok(IssuedPair {
            tokens: TokenPair {
                refresh,
                access_token,
            },
            refresh_jti: jti,
            refresh_expires_at,
        })
    }

    /// Issue an email-verification token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_verification(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Verify, self.verify_ttl, None, None)
    }

    /// Issue a one-time password-reset token bound to the current hash.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Generation` if signing fails.
    pub fn issue_reset(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<String, TokenError> {
        self.issue(
            user_id,
            TokenPurpose::Reset,
            self.reset_ttl,
            None,
            Some(password_fingerprint(password_hash)),
        )
    }

    /// Verify a token and require the given purpose.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` when the token is past its expiry,
    /// `TokenError::Invalid` for signature, shape, or purpose mismatches.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.purpose != purpose {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }

    /// Verify a reset token against the user's current password hash.
    ///
    /// A token issued before the hash changed no longer matches and is
    /// rejected, which makes reset links one-time.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` or `TokenError::Invalid` as [`Self::verify`].
    pub fn verify_reset(
        &self,
        token: &str,
        current_password_hash: &str,
    ) -> Result<Claims, TokenError> {
        let claims = self.verify(token, TokenPurpose::Reset)?;

        match &claims.fpt {
            Some(fpt) if *fpt == password_fingerprint(current_password_hash) => Ok(claims),
            _ => Err(TokenError::Invalid),
        }
    }

    fn issue(
        &self,
        user_id: UserId,
        purpose: TokenPurpose,
        ttl: Duration,
        jti: Option<Uuid>,
        fpt: Option<String>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_i32(),
            purpose,
            jti,
            fpt,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Generation)
    }
}

/// Short fingerprint of a password hash, embedded in reset tokens.
#[must_use]
pub fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    let mut fpt = hex::encode(digest);
    fpt.truncate(16);
    fpt
}

/// Encode a user id as the URL-safe `uidb64` path segment of reset links.
#[must_use]
pub fn encode_uid(user_id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(user_id.as_i32().to_string())
}

/// Decode a `uidb64` path segment back into a user id.
#[must_use]
pub fn decode_uid(uidb64: &str) -> Option<UserId> {
    let bytes = URL_SAFE_NO_PAD.decode(uidb64).ok()?;
    let s = String::from_utf8(bytes).ok()?;
    s.parse::<i32>().ok().map(UserId::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(access_ttl_minutes: i64) -> TokenConfig {
        TokenConfig {
            secret: SecretString::from("0123456789abcdef0123456789abcdef-test"),
            access_ttl_minutes,
            refresh_ttl_days: 7,
            verify_ttl_hours: 24,
            reset_ttl_minutes: 30,
        }
    }

    fn service() -> TokenService {
        TokenService::new(&config(60))
    }

    #[test]
    fn test_access_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue_access(UserId::new(7)).expect("issue");
        let claims = tokens.verify(&token, TokenPurpose::Access).expect("verify");
        assert_eq!(claims.user_id(), UserId::new(7));
        assert!(claims.jti.is_none());
    }

    #[test]
    fn test_purpose_mismatch_is_invalid() {
        let tokens = service();
        let token = tokens.issue_verification(UserId::new(7)).expect("issue");
        assert_eq!(
            tokens.verify(&token, TokenPurpose::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Issue with a TTL far enough in the past to clear validation leeway.
        let tokens = TokenService::new(&config(-10));
        let token = tokens.issue_access(UserId::new(7)).expect("issue");
        assert_eq!(
            tokens.verify(&token, TokenPurpose::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert_eq!(
            service().verify("not-a-token", TokenPurpose::Access),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_refresh_pair_carries_jti() {
        let tokens = service();
        let issued = tokens.issue_pair(UserId::new(3)).expect("issue");
        let claims = tokens
            .verify(&issued.tokens.refresh, TokenPurpose::Refresh)
            .expect("verify");
        assert_eq!(claims.jti, Some(issued.refresh_jti));
        assert!(issued.refresh_expires_at > Utc::now());
    }

    #[test]
    fn test_reset_token_bound_to_password_hash() {
        let tokens = service();
        let token = tokens
            .issue_reset(UserId::new(5), "old-hash")
            .expect("issue");

        assert!(tokens.verify_reset(&token, "old-hash").is_ok());
        // After the password changes, the same link stops working.
        assert_eq!(
            tokens.verify_reset(&token, "new-hash"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn test_uid_roundtrip() {
        let uid = encode_uid(UserId::new(42));
        assert_eq!(decode_uid(&uid), Some(UserId::new(42)));
        assert_eq!(decode_uid("!!not-base64!!"), None);
    }
}

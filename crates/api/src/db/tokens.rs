//! Refresh-token repository.
//!
//! Refresh tokens are JWTs, but their `jti` is persisted so logout can
//! revoke a token before it expires.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mangrove_core::UserId;

use super::RepositoryError;

/// Repository for refresh-token bookkeeping.
pub struct RefreshTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RefreshTokenRepository<'a> {
    /// Create a new refresh-token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a freshly issued refresh token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        jti: Uuid,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (jti, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Revoke a refresh token.
    ///
    /// # Returns
    ///
    /// `true` if a live token was revoked; `false` if the token is unknown
    /// or was already revoked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn revoke(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE WHERE jti = $1 AND revoked = FALSE",
        )
        .bind(jti)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a refresh token is still usable (known, unrevoked, unexpired).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_active(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 FROM refresh_tokens \
                 WHERE jti = $1 AND revoked = FALSE AND expires_at > now() \
             )",
        )
        .bind(jti)
        .fetch_one(self.pool)
        .await?;

        Ok(active)
    }
}

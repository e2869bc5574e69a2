//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MANGROVE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MANGROVE_BASE_URL` - Public URL used in verification/reset links
//! - `MANGROVE_JWT_SECRET` - Token signing secret (min 32 chars)
//!
//! ## Optional
//! - `MANGROVE_HOST` - Bind address (default: 127.0.0.1)
//! - `MANGROVE_PORT` - Listen port (default: 8000)
//! - `MANGROVE_ACCESS_TTL_MINUTES` - Access token lifetime (default: 60)
//! - `MANGROVE_REFRESH_TTL_DAYS` - Refresh token lifetime (default: 7)
//! - `MANGROVE_VERIFY_TTL_HOURS` - Email verification link lifetime (default: 24)
//! - `MANGROVE_RESET_TTL_MINUTES` - Password reset link lifetime (default: 30)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_FROM` -
//!   outbound mail; when `SMTP_HOST` is unset, emails are logged instead of sent
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used when building email links
    pub base_url: String,
    /// Token signing configuration
    pub tokens: TokenConfig,
    /// Outbound email configuration; `None` disables real delivery
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. `production`)
    pub sentry_environment: Option<String>,
}

/// Signing secret and lifetimes for the four token purposes.
#[derive(Clone)]
pub struct TokenConfig {
    /// HS256 signing secret
    pub secret: SecretString,
    /// Access token lifetime in minutes
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_ttl_days: i64,
    /// Email verification link lifetime in hours
    pub verify_ttl_hours: i64,
    /// Password reset link lifetime in minutes
    pub reset_ttl_minutes: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("verify_ttl_hours", &self.verify_ttl_hours)
            .field("reset_ttl_minutes", &self.reset_ttl_minutes)
            .finish()
    }
}

/// SMTP delivery configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: SecretString,
    /// From address for outbound mail
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the JWT secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MANGROVE_DATABASE_URL")?;
        let host = get_env_or_default("MANGROVE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MANGROVE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MANGROVE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MANGROVE_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("MANGROVE_BASE_URL")?;

        let tokens = TokenConfig::from_env()?;
        let email = EmailConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            tokens,
            email,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = SecretString::from(get_required_env("MANGROVE_JWT_SECRET")?);
        validate_signing_secret(&secret, "MANGROVE_JWT_SECRET")?;

        Ok(Self {
            secret,
            access_ttl_minutes: get_parsed_or_default("MANGROVE_ACCESS_TTL_MINUTES", 60)?,
            refresh_ttl_days: get_parsed_or_default("MANGROVE_REFRESH_TTL_DAYS", 7)?,
            verify_ttl_hours: get_parsed_or_default("MANGROVE_VERIFY_TTL_HOURS", 24)?,
            reset_ttl_minutes: get_parsed_or_default("MANGROVE_RESET_TTL_MINUTES", 30)?,
        })
    }
}

impl EmailConfig {
    /// `None` when `SMTP_HOST` is unset; the mail service then logs links
    /// instead of sending them, which is what local development wants.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };

        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: SecretString::from(get_required_env("SMTP_PASSWORD")?),
            from_address: get_required_env("SMTP_FROM")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an i64 environment variable with a default value.
fn get_parsed_or_default(key: &str, default: i64) -> Result<i64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Validate that a signing secret is long enough and not a placeholder.
fn validate_signing_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("contains placeholder pattern \"{pattern}\""),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        let secret = SecretString::from("too-short");
        assert!(matches!(
            validate_signing_secret(&secret, "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let secret = SecretString::from("changeme-changeme-changeme-changeme-1234");
        assert!(matches!(
            validate_signing_secret(&secret, "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_strong_secret_accepted() {
        let secret = SecretString::from("kQ2vB8dJ4wN1xR7tG5yH9mC3pZ6aL0eF2sU8iO4j");
        assert!(validate_signing_secret(&secret, "TEST").is_ok());
    }
}

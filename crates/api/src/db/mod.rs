//! Database operations for the Mangrove `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users`, `profiles`, `refresh_tokens` - identity and sessions
//! - `categories`, `products`, `product_images` - catalog
//! - `saved_products`, `recent_products` - per-user product sets
//! - `orders`, `order_items`, `order_deliveries` - cart/order lifecycle
//! - `posts`, `tags`, `post_tags`, `comments` - blog
//!
//! All queries use the runtime `sqlx` API (`query`, `query_as`) with
//! `FromRow` domain types from [`crate::models`].
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p mangrove-cli -- migrate
//! ```

pub mod blog;
pub mod catalog;
pub mod orders;
pub mod tokens;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use blog::BlogRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use tokens::RefreshTokenRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_unique_violation(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

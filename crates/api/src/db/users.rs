//! User and profile repository.

use sqlx::PgPool;

use mangrove_core::{Email, UserId};

use super::RepositoryError;
use crate::models::{Profile, User};

/// Columns selected into [`User`]; the password hash deliberately stays out.
const USER_COLUMNS: &str = "id, username, email, first_name, last_name, phone, \
                            is_verified, is_active, is_staff, created_at, updated_at";

/// Fields required to insert a new account row.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a Email,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

/// The nullable address fields of a profile.
#[derive(Debug, Default, Clone)]
pub struct ProfileFields {
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Repository for user and profile database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email (or derived username)
    /// is already taken, `RepositoryError::Database` for other failures.
    pub async fn create(&self, new_user: &NewUser<'_>) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (username, email, first_name, last_name, phone, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(new_user.username)
            .bind(new_user.email)
            .bind(new_user.first_name)
            .bind(new_user.last_name)
            .bind(new_user.phone)
            .bind(new_user.password_hash)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique_violation(e, "email"))
    }

    /// Get a user by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Get a user together with their password hash, for credential checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");

        let row = sqlx::query_as::<_, UserWithPassword>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    /// Get a user's current password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password(&self, id: UserId, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Mark a user's email as verified. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn mark_verified(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Update the user's names; `None` keeps the current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_names(
        &self,
        id: UserId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET first_name = COALESCE($1, first_name), \
                 last_name = COALESCE($2, last_name), \
                 updated_at = now() \
             WHERE id = $3",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Profile (one address per user)
    // =========================================================================

    /// Get a user's address profile, if they have created one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_profile(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, state, country, city, address FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?)
    }

    /// Create the user's address profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a profile already exists.
    pub async fn create_profile(
        &self,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (user_id, state, country, city, address) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, state, country, city, address",
        )
        .bind(user_id)
        .bind(fields.state.as_deref())
        .bind(fields.country.as_deref())
        .bind(fields.city.as_deref())
        .bind(fields.address.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique_violation(e, "address"))
    }

    /// Update the user's address profile; `None` keeps the current value.
    ///
    /// # Returns
    ///
    /// `true` if a profile row was updated, `false` if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        fields: &ProfileFields,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE profiles \
             SET state = COALESCE($1, state), \
                 country = COALESCE($2, country), \
                 city = COALESCE($3, city), \
                 address = COALESCE($4, address) \
             WHERE user_id = $5",
        )
        .bind(fields.state.as_deref())
        .bind(fields.country.as_deref())
        .bind(fields.city.as_deref())
        .bind(fields.address.as_deref())
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the user's address profile.
    ///
    /// # Returns
    ///
    /// `true` if a profile row was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_profile(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Private row type for credential lookups.
#[derive(sqlx::FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

//! User and profile domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use mangrove_core::{Email, ProfileId, UserId};

/// A registered account.
///
/// The password hash never leaves the repository layer; this type is safe to
/// serialize into response payloads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Derived from the email local part at registration.
    pub username: String,
    /// Unique, normalized email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// Flipped once by the email verification link.
    pub is_verified: bool,
    /// Soft-disable switch; inactive accounts cannot log in.
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's display name, as used in comment attribution and emails.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The user's permanent address profile (one per user).
///
/// Distinct from the per-order shipping snapshot taken at checkout.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            username: "ada".to_owned(),
            email: Email::parse("ada@example.com").expect("valid email"),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            phone: "+2348012345678".to_owned(),
            is_verified: true,
            is_active: true,
            is_staff: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_serialized_user_has_no_password_field() {
        let value = serde_json::to_value(sample_user()).expect("serialize");
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "ada@example.com");
    }
}

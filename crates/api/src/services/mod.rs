//! Business logic services.
//!
//! # Services
//!
//! - `auth` - registration, credential checks, password management
//! - `token` - signed access/refresh/verification/reset tokens
//! - `email` - outbound verification and reset mail

pub mod auth;
pub mod email;
pub mod token;

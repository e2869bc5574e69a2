//! Domain types backing the API.
//!
//! These are the validated shapes handlers and repositories exchange. Row
//! mapping is derived with `sqlx::FromRow`; serialization with `serde` where
//! a type appears in response payloads.

pub mod blog;
pub mod catalog;
pub mod order;
pub mod user;

pub use blog::{Comment, Post, SimilarPost};
pub use catalog::{Category, Product, ProductImage, ProductListItem};
pub use order::{Order, OrderDelivery, OrderItem};
pub use user::{Profile, User};

//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use mangrove_core::{CategoryId, ProductId, ProductImageId};

/// A product category (admin-managed, rarely mutated).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub description: String,
    /// Current catalog price; cart line items snapshot this at add-time.
    pub price: Decimal,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An additional image attached to a product.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// A product row joined with its category, as returned by the saved-items
/// and recent-items listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductListItem {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub category_name: String,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: Decimal,
}

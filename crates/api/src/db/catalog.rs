//! Catalog repository: categories, products, and the per-user saved /
//! recently-viewed product sets.

use sqlx::PgPool;

use mangrove_core::{CategoryId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Category, Product, ProductImage, ProductListItem};

const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, image, description, price, \
                               available, created_at, updated_at";

/// Join used by the saved-items and recent-items listings.
const LIST_ITEM_COLUMNS: &str = "p.id, p.category_id, c.name AS category_name, p.name, \
                                 p.slug, p.image, p.price";

/// Repository for catalog reads and user-product set writes.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, image FROM categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, image FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?)
    }

    /// List all products, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");

        Ok(sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Extra images attached to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn extra_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        Ok(sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, image, description FROM product_images WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?)
    }

    // =========================================================================
    // Saved items (favorites)
    // =========================================================================

    /// Add a product to the user's saved set. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_saved(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO saved_products (user_id, product_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product from the user's saved set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_saved(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM saved_products WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Clear the user's saved set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_saved(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM saved_products WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// List the user's saved products joined with category data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_saved(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductListItem>, RepositoryError> {
        let sql = format!(
            "SELECT {LIST_ITEM_COLUMNS} \
             FROM saved_products s \
             JOIN products p ON p.id = s.product_id \
             JOIN categories c ON c.id = p.category_id \
             WHERE s.user_id = $1 \
             ORDER BY p.name"
        );

        Ok(sqlx::query_as::<_, ProductListItem>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?)
    }

    // =========================================================================
    // Recently viewed
    // =========================================================================

    /// Record that the user viewed a product.
    ///
    /// Idempotent on membership: a repeat view only refreshes `viewed_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn record_view(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO recent_products (user_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, product_id) DO UPDATE SET viewed_at = now()",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// List the user's recently viewed products, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductListItem>, RepositoryError> {
        let sql = format!(
            "SELECT {LIST_ITEM_COLUMNS} \
             FROM recent_products r \
             JOIN products p ON p.id = r.product_id \
             JOIN categories c ON c.id = p.category_id \
             WHERE r.user_id = $1 \
             ORDER BY r.viewed_at DESC"
        );

        Ok(sqlx::query_as::<_, ProductListItem>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Remove a product from the user's recently viewed set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_recent(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM recent_products WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Clear the user's recently viewed set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_recent(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM recent_products WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

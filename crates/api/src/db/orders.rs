//! Order repository: cart writes, checkout, and order reads.
//!
//! The cart operates under two uniqueness rules enforced by the schema:
//! at most one `IN_CART` order per user (partial unique index) and at most
//! one line item per (order, product). Both cart writes below are single
//! atomic statements against those constraints, so concurrent add-to-cart
//! requests for the same user cannot create duplicate carts or lose an
//! increment.

use sqlx::PgPool;

use mangrove_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderDelivery, OrderItem, Product};

const ORDER_COLUMNS: &str =
    "id, user_id, status, meta, receipt_number, paid, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, price, quantity";

/// Shipping address fields captured at checkout.
#[derive(Debug, Clone)]
pub struct ShippingFields {
    pub first_name: String,
    pub last_name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

/// Repository for cart and order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's open cart order, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart(&self, user_id: UserId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND status = $2"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(OrderStatus::InCart)
            .fetch_optional(self.pool)
            .await?)
    }

    /// Line items of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");

        Ok(sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Add a product to the user's cart, creating the cart if needed.
    ///
    /// The cart is found-or-created with `ON CONFLICT DO NOTHING` against the
    /// one-cart-per-user index; the line item is a single upsert that sums
    /// quantities when the product is already in the cart (the increment
    /// policy). The product's current price is snapshotted on first add.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product: &Product,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (user_id) VALUES ($1) \
             ON CONFLICT (user_id) WHERE status = 'IN_CART' DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            "SELECT id FROM orders WHERE user_id = $1 AND status = $2",
        )
        .bind(user_id)
        .bind(OrderStatus::InCart)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, price, quantity) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (order_id, product_id) \
             DO UPDATE SET quantity = order_items.quantity + EXCLUDED.quantity",
        )
        .bind(order_id)
        .bind(product.id)
        .bind(product.price)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remove one product's line item from the user's cart.
    ///
    /// # Returns
    ///
    /// `true` if a line item was deleted, `false` if the cart doesn't exist
    /// or doesn't contain the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM order_items \
             WHERE product_id = $1 \
               AND order_id IN (SELECT id FROM orders WHERE user_id = $2 AND status = $3)",
        )
        .bind(product_id)
        .bind(user_id)
        .bind(OrderStatus::InCart)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete the user's cart order entirely (line items cascade).
    ///
    /// # Returns
    ///
    /// `true` if a cart order was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND status = $2")
            .bind(user_id)
            .bind(OrderStatus::InCart)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Check out the user's cart: `IN_CART -> ORDER_PLACED`, stamped receipt,
    /// paid flag, and a shipping snapshot, atomically.
    ///
    /// The `UPDATE` only matches an `IN_CART` order with the given id owned
    /// by the user, so checking out an already-placed (or foreign) order
    /// matches nothing and returns `None` rather than silently re-placing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn checkout(
        &self,
        user_id: UserId,
        order_id: OrderId,
        shipping: &ShippingFields,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE orders \
             SET status = $1, paid = TRUE, receipt_number = $2, updated_at = now() \
             WHERE id = $3 AND user_id = $4 AND status = $5 \
             RETURNING {ORDER_COLUMNS}"
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(OrderStatus::OrderPlaced)
            .bind(Order::format_receipt(order_id))
            .bind(order_id)
            .bind(user_id)
            .bind(OrderStatus::InCart)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO order_deliveries \
                 (order_id, first_name, last_name, state, country, city, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(&shipping.first_name)
        .bind(&shipping.last_name)
        .bind(shipping.state.as_deref())
        .bind(shipping.country.as_deref())
        .bind(shipping.city.as_deref())
        .bind(shipping.address.as_deref())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(order))
    }

    /// List the user's placed orders (everything that has left the cart),
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_placed(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE user_id = $1 AND status <> $2 \
             ORDER BY created_at DESC"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(OrderStatus::InCart)
            .fetch_all(self.pool)
            .await?)
    }

    /// Get one of the user's placed orders by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_placed(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE id = $1 AND user_id = $2 AND status <> $3"
        );

        Ok(sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .bind(user_id)
            .bind(OrderStatus::InCart)
            .fetch_optional(self.pool)
            .await?)
    }

    /// The shipping snapshot recorded for an order at checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delivery(
        &self,
        order_id: OrderId,
    ) -> Result<Option<OrderDelivery>, RepositoryError> {
        Ok(sqlx::query_as::<_, OrderDelivery>(
            "SELECT id, order_id, first_name, last_name, state, country, city, address \
             FROM order_deliveries WHERE order_id = $1 \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?)
    }
}

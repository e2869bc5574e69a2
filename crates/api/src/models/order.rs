//! Order, line item and shipping snapshot domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use mangrove_core::{DeliveryId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// Receipt number prefix; receipts read `MGV00042`.
const RECEIPT_PREFIX: &str = "MGV";

/// An order, from open cart to fulfilment.
///
/// Created implicitly with status `IN_CART` on the first cart write; checkout
/// moves it to `ORDER_PLACED` and stamps `receipt_number`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub meta: serde_json::Value,
    pub receipt_number: Option<String>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The receipt number an order gets at checkout.
    #[must_use]
    pub fn format_receipt(id: OrderId) -> String {
        format!("{RECEIPT_PREFIX}{:05}", id.as_i32())
    }
}

/// A line item: product reference, quantity, and the price snapshotted when
/// the product was first added to the cart. Later catalog price changes do
/// not propagate here.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub price: Decimal,
    pub quantity: i32,
}

impl OrderItem {
    /// `price × quantity` for this line.
    #[must_use]
    pub fn cost(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order total: the sum of `price × quantity` over the current line items.
///
/// Computed on demand, never frozen at placement.
#[must_use]
pub fn total_cost(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::cost).sum()
}

/// Shipping address snapshot captured at checkout, independent of the
/// user's profile address.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderDelivery {
    pub id: DeliveryId,
    pub order_id: OrderId,
    pub first_name: String,
    pub last_name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("decimal literal")
    }

    fn item(id: i32, price: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(1),
            product_id: ProductId::new(id),
            price: dec(price),
            quantity,
        }
    }

    #[test]
    fn test_line_cost_is_price_times_quantity() {
        assert_eq!(item(1, "19.99", 3).cost(), dec("59.97"));
    }

    #[test]
    fn test_total_is_sum_over_line_items() {
        let items = vec![item(1, "19.99", 2), item(2, "5.00", 1), item(3, "0.50", 4)];
        assert_eq!(total_cost(&items), dec("46.98"));
    }

    #[test]
    fn test_total_of_empty_cart_is_zero() {
        assert_eq!(total_cost(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_receipt_number_is_zero_padded() {
        assert_eq!(Order::format_receipt(OrderId::new(42)), "MGV00042");
        assert_eq!(Order::format_receipt(OrderId::new(123_456)), "MGV123456");
    }
}

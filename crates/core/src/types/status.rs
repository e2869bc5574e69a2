//! Order lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// An order is born as a cart (`InCart`) the first time a product is added,
/// becomes `OrderPlaced` at checkout, and is then moved along by fulfilment:
///
/// ```text
/// IN_CART -> ORDER_PLACED -> ORDER_DISPATCHED -> ORDER_DELIVERED
///                         |-> ORDER_CANCELED
///                         '-> ORDER_RETURNED
/// ```
///
/// `OrderDelivered`, `OrderCanceled` and `OrderReturned` are terminal.
/// The wire and database representation is the SCREAMING_SNAKE_CASE name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Open cart; line items may still be added, changed and removed.
    #[default]
    InCart,
    /// Checked out and paid; line items are frozen by convention.
    OrderPlaced,
    /// Handed to the carrier.
    OrderDispatched,
    /// Received by the customer.
    OrderDelivered,
    /// Canceled after placement.
    OrderCanceled,
    /// Sent back by the customer.
    OrderReturned,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::InCart,
        Self::OrderPlaced,
        Self::OrderDispatched,
        Self::OrderDelivered,
        Self::OrderCanceled,
        Self::OrderReturned,
    ];

    /// The wire/database name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InCart => "IN_CART",
            Self::OrderPlaced => "ORDER_PLACED",
            Self::OrderDispatched => "ORDER_DISPATCHED",
            Self::OrderDelivered => "ORDER_DELIVERED",
            Self::OrderCanceled => "ORDER_CANCELED",
            Self::OrderReturned => "ORDER_RETURNED",
        }
    }

    /// Whether no further transition is allowed out of this status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::OrderDelivered | Self::OrderCanceled | Self::OrderReturned
        )
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::InCart, Self::OrderPlaced)
                | (
                    Self::OrderPlaced,
                    Self::OrderDispatched | Self::OrderCanceled | Self::OrderReturned
                )
                | (Self::OrderDispatched, Self::OrderDelivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_CART" => Ok(Self::InCart),
            "ORDER_PLACED" => Ok(Self::OrderPlaced),
            "ORDER_DISPATCHED" => Ok(Self::OrderDispatched),
            "ORDER_DELIVERED" => Ok(Self::OrderDelivered),
            "ORDER_CANCELED" => Ok(Self::OrderCanceled),
            "ORDER_RETURNED" => Ok(Self::OrderReturned),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

// Stored as TEXT in Postgres, same as the serde representation.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse::<Self>()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().expect("parse");
            assert_eq!(parsed, status);
        }
        assert!("SHOPPING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::OrderPlaced).expect("serialize");
        assert_eq!(json, "\"ORDER_PLACED\"");
        let back: OrderStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, OrderStatus::OrderPlaced);
    }

    #[test]
    fn test_checkout_is_the_only_step_out_of_cart() {
        for status in OrderStatus::ALL {
            let legal = OrderStatus::InCart.can_transition_to(status);
            assert_eq!(legal, status == OrderStatus::OrderPlaced);
        }
    }

    #[test]
    fn test_fulfilment_transitions() {
        use OrderStatus::{
            OrderCanceled, OrderDelivered, OrderDispatched, OrderPlaced, OrderReturned,
        };

        assert!(OrderPlaced.can_transition_to(OrderDispatched));
        assert!(OrderPlaced.can_transition_to(OrderCanceled));
        assert!(OrderPlaced.can_transition_to(OrderReturned));
        assert!(!OrderPlaced.can_transition_to(OrderDelivered));

        assert!(OrderDispatched.can_transition_to(OrderDelivered));
        assert!(!OrderDispatched.can_transition_to(OrderCanceled));
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for terminal in [
            OrderStatus::OrderDelivered,
            OrderStatus::OrderCanceled,
            OrderStatus::OrderReturned,
        ] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_no_transition_reenters_cart() {
        for status in OrderStatus::ALL {
            assert!(!status.can_transition_to(OrderStatus::InCart));
        }
    }
}

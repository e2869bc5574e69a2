//! Cart and order route handlers.
//!
//! The cart is an order row in `IN_CART` state, created implicitly on the
//! first add. Checkout (`POST /orders/pay`) is the only state transition
//! exposed here; dispatch/delivery/cancellation are back-office concerns.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::json;

use mangrove_core::{OrderId, ProductId};

use crate::db::catalog::CatalogRepository;
use crate::db::orders::{OrderRepository, ShippingFields};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::order::total_cost;
use crate::response::ApiResponse;
use crate::routes::account::ProductIdQuery;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Add-to-cart payload.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i32,
    pub quantity: i32,
}

/// Checkout payload: the cart order id plus the shipping address snapshot.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub state: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// `GET /orders/cart` - line items of the open cart, or an empty list.
pub async fn cart_view(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    let orders = OrderRepository::new(state.pool());

    let items = match orders.cart(user.id).await? {
        Some(cart) => orders.items(cart.id).await?,
        None => Vec::new(),
    };

    Ok(ApiResponse::success("Order in cart loaded", items))
}

/// `POST /orders/cart` - add a product to the cart.
///
/// Adding a product that is already in the cart sums the quantities into
/// the existing line item; the price snapshot from the first add is kept.
pub async fn cart_add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<AddToCartRequest>,
) -> Result<ApiResponse> {
    if payload.quantity <= 0 {
        return Err(AppError::Validation("Invalid quantity".to_owned()));
    }

    let product = CatalogRepository::new(state.pool())
        .get_product(ProductId::new(payload.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    OrderRepository::new(state.pool())
        .add_item(user.id, &product, payload.quantity)
        .await?;

    Ok(ApiResponse::success("Cart updated successfully", json!([])))
}

/// `DELETE /orders/cart[?product_id=]` - remove one line item, or drop the
/// whole cart when no product is given.
pub async fn cart_remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<ProductIdQuery>,
) -> Result<ApiResponse> {
    let orders = OrderRepository::new(state.pool());

    let message = match query.product_id {
        Some(id) => {
            let product = CatalogRepository::new(state.pool())
                .get_product(ProductId::new(id))
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

            let removed = orders.remove_item(user.id, product.id).await?;
            if !removed {
                // Known product, but not a line item of this user's cart.
                return Err(AppError::NotFound("Product not found".to_owned()));
            }

            format!("{} deleted from cart", product.name)
        }
        None => {
            orders.clear_cart(user.id).await?;
            "Cart cleared successfully".to_owned()
        }
    };

    Ok(ApiResponse::success(message, json!([])))
}

// =============================================================================
// Orders
// =============================================================================

/// `GET /orders` - the user's placed orders (carts are excluded).
pub async fn orders_list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ApiResponse> {
    let orders = OrderRepository::new(state.pool()).list_placed(user.id).await?;

    Ok(ApiResponse::success("Orders List View", orders))
}

/// `GET /orders/{id}` - placed-order detail with items, total and shipping.
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<ApiResponse> {
    let orders = OrderRepository::new(state.pool());

    let order = orders
        .get_placed(user.id, OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let items = orders.items(order.id).await?;
    let shipping = orders.delivery(order.id).await?;
    let total = total_cost(&items);

    Ok(ApiResponse::success(
        "Order Detail View",
        json!({
            "order": order,
            "items": items,
            "total_cost": total,
            "shipping_address": shipping,
        }),
    ))
}

/// `POST /orders/pay` - check out the cart.
///
/// Transitions the user's `IN_CART` order with the given id to
/// `ORDER_PLACED`, marks it paid, stamps the receipt number and records
/// the shipping snapshot, all atomically. An order that is not this
/// user's open cart (already placed, foreign, unknown) is a 404, never
/// a silent re-placement.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(payload): Json<CheckoutRequest>,
) -> Result<ApiResponse> {
    let shipping = ShippingFields {
        first_name: payload.first_name,
        last_name: payload.last_name,
        state: payload.state,
        country: payload.country,
        city: payload.city,
        address: payload.address,
    };

    let order = OrderRepository::new(state.pool())
        .checkout(user.id, OrderId::new(payload.order_id), &shipping)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    Ok(ApiResponse::success("Order placed successfully", order))
}

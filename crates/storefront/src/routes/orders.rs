//! Order history and shipping-info route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use copperleaf_core::OrderId;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Order, ShippingDetails};
use crate::state::AppState;

/// List the signed-in user's orders, newest first.
///
/// # Route
///
/// `GET /orders`
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_by_email(&user.email)
        .await?;
    Ok(Json(orders))
}

/// Fetch a single order by ID.
///
/// Deliberately unauthenticated: the post-payment confirmation page
/// loads before the buyer has any session, so the order ID itself is
/// the capability.
///
/// # Route
///
/// `GET /orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".into()))?;
    Ok(Json(order))
}

/// Return the signed-in user's most recent contact and address fields,
/// or all-empty strings if they have never ordered.
///
/// # Route
///
/// `GET /shipping`
pub async fn shipping(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ShippingDetails>, AppError> {
    let last = OrderRepository::new(state.pool())
        .last_by_email(&user.email)
        .await?;
    Ok(Json(last.map_or_else(ShippingDetails::empty, |order| {
        order.shipping
    })))
}

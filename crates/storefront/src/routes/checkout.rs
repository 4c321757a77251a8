//! Checkout route handler.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::services::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Create a hosted checkout session from a client cart.
///
/// The response carries only the payment page URL; everything priced
/// was derived server-side.
///
/// # Route
///
/// `POST /checkout`
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let service = CheckoutService::new(state.pool(), state.payments(), state.base_url());
    let session = service.begin(&request).await?;

    tracing::info!(session_id = %session.id, "checkout session created");

    Ok(Json(json!({ "url": session.url })))
}

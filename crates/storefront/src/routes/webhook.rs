//! Payment gateway webhook handler.
//!
//! The only write path into the order store. The body must stay raw
//! bytes until the signature verifies; any re-encoding would change
//! the signed message.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::services::reconciler;
use crate::state::AppState;

/// Signature header set by the payment gateway.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receive a gateway event, verify it, and reconcile paid sessions
/// into orders.
///
/// Events that verify but do not represent a settled payment are
/// acknowledged and dropped; the gateway should not redeliver them.
///
/// # Route
///
/// `POST /webhook`
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("missing {SIGNATURE_HEADER} header")))?;

    let event = state.payments().construct_event(&body, signature)?;

    if let Some(command) = reconciler::plan(&event) {
        let order = reconciler::execute(state.pool(), &command).await?;
        tracing::info!(
            order_id = %order.id,
            session_id = %event.data.object.id,
            "order recorded from paid checkout session"
        );
    } else {
        tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
    }

    Ok(Json(json!({ "received": true })))
}

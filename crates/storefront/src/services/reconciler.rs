//! Order reconciler.
//!
//! Consumes verified gateway webhook events and writes orders. The
//! event itself carries no prices; the cart snapshot in the metadata is
//! re-priced against the catalog, the same derivation the checkout
//! builder used. Split into a pure planning step and an effectful
//! execution step so the decision logic is testable without a
//! database.
//!
//! Deliveries are not deduplicated: a redelivered event writes a second
//! identical order. Acceptable for now because the gateway only
//! redelivers on our own 5xx responses.

use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use tracing::warn;

use copperleaf_core::ProductId;

use super::derive_line_item;
use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::{CartEntry, LineItem, NewOrder, Order, Product, ShippingDetails};
use crate::payments::{CHECKOUT_SESSION_COMPLETED, PAYMENT_STATUS_PAID, WebhookEvent};

/// Errors from reconciling a webhook event into an order.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The session metadata was unusable. Terminal: redelivery would
    /// carry the same metadata, so the delivery is not retried.
    #[error("invalid session metadata: {0}")]
    InvalidMetadata(String),

    /// Database failure. The webhook responds 5xx so the gateway
    /// redelivers.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A decision to write one order, extracted from a paid event.
#[derive(Debug, Clone)]
pub struct ReconciliationCommand {
    /// Contact and address fields from session metadata. Missing keys
    /// become empty strings, never a rejected order.
    pub shipping: ShippingDetails,
    /// Cart snapshot as serialized into the session metadata.
    pub cart_json: String,
}

/// Decide whether an event warrants writing an order.
///
/// Only `checkout.session.completed` events whose payment actually
/// settled produce a command; everything else is acknowledged and
/// dropped.
#[must_use]
pub fn plan(event: &WebhookEvent) -> Option<ReconciliationCommand> {
    if event.event_type != CHECKOUT_SESSION_COMPLETED {
        return None;
    }
    let session = &event.data.object;
    if session.payment_status != PAYMENT_STATUS_PAID {
        return None;
    }

    let field = |key: &str| session.metadata.get(key).cloned().unwrap_or_default();

    Some(ReconciliationCommand {
        shipping: ShippingDetails {
            first_name: field("firstName"),
            last_name: field("lastName"),
            email: field("email"),
            phone: field("phone"),
            address: field("address"),
            address2: field("address2"),
            state: field("state"),
            city: field("city"),
            country: field("country"),
            postal_code: field("postalCode"),
        },
        cart_json: field("cartItems"),
    })
}

/// Execute a reconciliation command: re-price the cart snapshot and
/// persist the order.
///
/// # Errors
///
/// Returns `ReconcileError::InvalidMetadata` if the cart snapshot is
/// not parseable, and `ReconcileError::Repository` on database
/// failure.
pub async fn execute(
    pool: &PgPool,
    command: &ReconciliationCommand,
) -> Result<Order, ReconcileError> {
    let entries: Vec<CartEntry> = serde_json::from_str(&command.cart_json)
        .map_err(|e| ReconcileError::InvalidMetadata(format!("cart snapshot: {e}")))?;

    let ids: Vec<ProductId> = entries.iter().filter_map(CartEntry::product_id).collect();
    let products: HashMap<ProductId, Product> = ProductRepository::new(pool)
        .get_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let line_items = line_items_for(&entries, &products);

    let order = OrderRepository::new(pool)
        .insert(&NewOrder {
            line_items,
            shipping: command.shipping.clone(),
            paid: true,
        })
        .await?;

    Ok(order)
}

/// Price the snapshot entries that still resolve to catalog products.
///
/// A product deleted between checkout and payment confirmation must not
/// block the order: the buyer has already paid. Such entries are
/// dropped with a warning instead.
fn line_items_for(
    entries: &[CartEntry],
    products: &HashMap<ProductId, Product>,
) -> Vec<LineItem> {
    entries
        .iter()
        .filter_map(|entry| {
            let item = entry
                .product_id()
                .and_then(|id| products.get(&id))
                .and_then(|product| derive_line_item(product, entry));
            if item.is_none() {
                warn!(product_id = %entry.id, "dropping vanished product from paid order");
            }
            item
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::test_fixtures::product;
    use super::*;
    use crate::payments::{EventData, SessionObject};

    fn paid_event(metadata: BTreeMap<String, String>) -> WebhookEvent {
        WebhookEvent {
            event_type: CHECKOUT_SESSION_COMPLETED.to_owned(),
            data: EventData {
                object: SessionObject {
                    id: "cs_test_123".to_owned(),
                    payment_status: PAYMENT_STATUS_PAID.to_owned(),
                    metadata,
                },
            },
        }
    }

    fn full_metadata() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("firstName".to_owned(), "Ada".to_owned()),
            ("lastName".to_owned(), "Lovelace".to_owned()),
            ("email".to_owned(), "ada@example.com".to_owned()),
            ("phone".to_owned(), "555-0100".to_owned()),
            ("address".to_owned(), "1 Analytical Way".to_owned()),
            ("city".to_owned(), "New York".to_owned()),
            ("country".to_owned(), "US".to_owned()),
            ("postalCode".to_owned(), "10001".to_owned()),
            (
                "cartItems".to_owned(),
                r#"[{"id":"1","quantity":2}]"#.to_owned(),
            ),
        ])
    }

    #[test]
    fn test_plan_paid_completion_produces_command() {
        let command = plan(&paid_event(full_metadata())).unwrap();
        assert_eq!(command.shipping.first_name, "Ada");
        assert_eq!(command.shipping.postal_code, "10001");
        assert_eq!(command.cart_json, r#"[{"id":"1","quantity":2}]"#);
    }

    #[test]
    fn test_plan_missing_metadata_defaults_to_empty() {
        let command = plan(&paid_event(BTreeMap::new())).unwrap();
        assert_eq!(command.shipping, ShippingDetails::empty());
        assert_eq!(command.cart_json, "");
    }

    #[test]
    fn test_plan_ignores_unpaid_session() {
        let mut event = paid_event(full_metadata());
        event.data.object.payment_status = "unpaid".to_owned();
        assert!(plan(&event).is_none());
    }

    #[test]
    fn test_plan_ignores_other_event_types() {
        let mut event = paid_event(full_metadata());
        event.event_type = "payment_intent.succeeded".to_owned();
        assert!(plan(&event).is_none());
    }

    #[test]
    fn test_plan_does_not_deduplicate_redelivery() {
        let event = paid_event(full_metadata());
        assert!(plan(&event).is_some());
        assert!(plan(&event).is_some());
    }

    #[test]
    fn test_line_items_reprice_from_catalog() {
        let entries: Vec<CartEntry> =
            serde_json::from_str(r#"[{"id":"1","quantity":2}]"#).unwrap();
        let products = HashMap::from([(ProductId::new(1), product(1, "Canvas Tote", 10, 0))]);

        let items = line_items_for(&entries, &products);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_amount, 1000);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_line_items_skip_vanished_products() {
        let entries: Vec<CartEntry> =
            serde_json::from_str(r#"[{"id":"1","quantity":1},{"id":"9","quantity":1}]"#).unwrap();
        let products = HashMap::from([(ProductId::new(1), product(1, "Canvas Tote", 10, 0))]);

        let items = line_items_for(&entries, &products);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Canvas Tote");
    }
}

//! Wire types for the payment gateway API.

use std::collections::BTreeMap;

use serde::Deserialize;

use copperleaf_core::CurrencyCode;

use crate::models::LineItem;

/// Event type emitted when a hosted checkout session finishes.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Payment status on a completed session whose payment actually settled.
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// Request to create a hosted checkout session.
///
/// Everything priced in here was derived server-side from the catalog;
/// the metadata is the only client-influenced content and the gateway
/// treats it as opaque.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    /// Buyer email, attached to the session for gateway receipts.
    pub customer_email: String,
    /// Where the gateway redirects after successful payment.
    pub success_url: String,
    /// Where the gateway redirects if the buyer abandons checkout.
    pub cancel_url: String,
    /// Currency for every line item in the session.
    pub currency: CurrencyCode,
    /// Server-derived line items.
    pub line_items: Vec<LineItem>,
    /// Opaque key/value payload echoed back on the webhook.
    pub metadata: BTreeMap<String, String>,
}

/// A created hosted checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Gateway-assigned session ID.
    pub id: String,
    /// Hosted payment page the client should redirect to.
    pub url: String,
}

/// A verified webhook event.
///
/// Only constructed by [`super::PaymentClient::construct_event`], so
/// holding one proves the signature checked out.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. [`CHECKOUT_SESSION_COMPLETED`].
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload.
    pub data: EventData,
}

/// Envelope around the event's object.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The checkout session the event describes.
    pub object: SessionObject,
}

/// Checkout session state as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    /// Gateway session ID.
    #[serde(default)]
    pub id: String,
    /// Settlement status, [`PAYMENT_STATUS_PAID`] once funds cleared.
    #[serde(default)]
    pub payment_status: String,
    /// Metadata round-tripped from session creation.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

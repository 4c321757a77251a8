//! Payment gateway client (Stripe-compatible hosted checkout).
//!
//! # Architecture
//!
//! The gateway is an opaque collaborator: we hand it priced line items
//! plus opaque metadata, it hands back a hosted-checkout redirect URL,
//! and later it calls our webhook with a signed event. Nothing here
//! moves money; the gateway owns that.
//!
//! Two trust boundaries live in this module:
//!
//! - outbound: only server-derived line items ever reach
//!   [`PaymentClient::create_session`]
//! - inbound: no field of a webhook payload is readable before
//!   [`PaymentClient::construct_event`] has verified its signature

mod client;
mod types;

pub use client::PaymentClient;
pub use types::{
    CHECKOUT_SESSION_COMPLETED, CheckoutSession, CreateSessionRequest, EventData,
    PAYMENT_STATUS_PAID, SessionObject, WebhookEvent,
};

use thiserror::Error;

/// Errors from payment gateway interactions.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request to the gateway failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned an error response.
    #[error("gateway error: {0}")]
    Api(String),

    /// Webhook signature verification failed. Terminal: the payload
    /// must not be processed and the delivery must not be retried.
    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Payload could not be parsed.
    #[error("payload parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

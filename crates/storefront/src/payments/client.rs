//! HTTP client for the payment gateway.

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::types::{CheckoutSession, CreateSessionRequest, WebhookEvent};
use super::PaymentError;
use crate::config::PaymentConfig;

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum age of a webhook timestamp before the delivery is rejected.
/// Bounds the replay window for captured payloads.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Client for the payment gateway's REST API.
pub struct PaymentClient {
    http: Client,
    api_base: String,
    secret_key: SecretString,
    webhook_secret: SecretString,
}

impl PaymentClient {
    /// Create a new gateway client from configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
        }
    }

    /// Create a hosted checkout session and return its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the request fails, or
    /// `PaymentError::Api` if the gateway rejects the session.
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let form = session_form(request);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or_else(|| format!("unexpected status {status}"));
            return Err(PaymentError::Api(message));
        }

        let session: CheckoutSession = response.json().await?;
        Ok(session)
    }

    /// Verify a webhook signature and parse the payload into an event.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if the signature header
    /// is malformed, stale, or does not match the payload, and
    /// `PaymentError::Parse` if the verified payload is not a valid
    /// event.
    pub fn construct_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.verify_signature(payload, signature_header)?;
        Ok(serde_json::from_slice(payload)?)
    }

    /// Verify the `t=<unix>,v1=<hex>` signature header against the raw
    /// request body.
    ///
    /// The signed message is `"{timestamp}.{payload}"`, authenticated
    /// with HMAC-SHA256 under the shared webhook secret. Multiple `v1`
    /// entries may appear during secret rotation; any match accepts.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` on any failure.
    pub fn verify_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), PaymentError> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| PaymentError::InvalidSignature("missing timestamp".into()))?;
        if candidates.is_empty() {
            return Err(PaymentError::InvalidSignature("missing v1 signature".into()));
        }

        let signed_at: i64 = timestamp
            .parse()
            .map_err(|_| PaymentError::InvalidSignature("malformed timestamp".into()))?;
        let age = chrono::Utc::now().timestamp() - signed_at;
        if age.abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(PaymentError::InvalidSignature(format!(
                "timestamp outside tolerance ({age}s)"
            )));
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.expose_secret().as_bytes())
            .map_err(|_| PaymentError::InvalidSignature("invalid webhook secret".into()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);

        for candidate in candidates {
            let Ok(expected) = hex::decode(candidate) else {
                continue;
            };
            // verify_slice is constant-time
            if mac.clone().verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }

        Err(PaymentError::InvalidSignature(
            "no signature matched the payload".into(),
        ))
    }
}

/// Flatten a session request into the gateway's indexed form encoding.
fn session_form(request: &CreateSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("customer_email".to_owned(), request.customer_email.clone()),
        ("success_url".to_owned(), request.success_url.clone()),
        ("cancel_url".to_owned(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        form.push((
            format!("line_items[{i}][price_data][currency]"),
            request.currency.gateway_code().to_owned(),
        ));
        form.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        // The gateway rejects empty product descriptions.
        if !item.description.is_empty() {
            form.push((
                format!("line_items[{i}][price_data][product_data][description]"),
                item.description.clone(),
            ));
        }
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use copperleaf_core::CurrencyCode;

    use super::*;
    use crate::models::LineItem;

    fn test_client() -> PaymentClient {
        PaymentClient::new(&PaymentConfig {
            api_base: "https://gateway.test".to_owned(),
            secret_key: SecretString::from("sk_test_4eC39HqLyjWDarjtT1zdp7dc"),
            webhook_secret: SecretString::from("whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG"),
        })
    }

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let client = test_client();
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign("whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG", chrono::Utc::now().timestamp(), payload);
        assert!(client.verify_signature(payload, &header).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let client = test_client();
        let header = sign(
            "whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG",
            chrono::Utc::now().timestamp(),
            br#"{"amount":1000}"#,
        );
        let err = client
            .verify_signature(br#"{"amount":9999}"#, &header)
            .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let client = test_client();
        let payload = b"{}";
        let header = sign("whsec_someOtherSecretEntirely00", chrono::Utc::now().timestamp(), payload);
        assert!(client.verify_signature(payload, &header).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let client = test_client();
        let payload = b"{}";
        let stale = chrono::Utc::now().timestamp() - 600;
        let header = sign("whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG", stale, payload);
        let err = client.verify_signature(payload, &header).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidSignature(_)));
    }

    #[test]
    fn test_malformed_header_rejected() {
        let client = test_client();
        for header in ["", "t=abc,v1=00", "v1=00", "t=12345", "garbage"] {
            assert!(
                client.verify_signature(b"{}", header).is_err(),
                "header {header:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rotation_accepts_any_matching_v1() {
        let client = test_client();
        let payload = b"{}";
        let ts = chrono::Utc::now().timestamp();
        let good = sign("whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG", ts, payload);
        let good_sig = good.split_once("v1=").unwrap().1;
        let header = format!("t={ts},v1=deadbeef,v1={good_sig}");
        assert!(client.verify_signature(payload, &header).is_ok());
    }

    #[test]
    fn test_construct_event_parses_completed_session() {
        let client = test_client();
        let payload = br#"{
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "payment_status": "paid",
                    "metadata": {"email": "ada@example.com"}
                }
            }
        }"#;
        let header = sign("whsec_Ua4lQ9PrzfjBm2sKvOXRh8wG", chrono::Utc::now().timestamp(), payload);
        let event = client.construct_event(payload, &header).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object.payment_status, "paid");
        assert_eq!(
            event.data.object.metadata.get("email").map(String::as_str),
            Some("ada@example.com")
        );
    }

    #[test]
    fn test_session_form_encoding() {
        let request = CreateSessionRequest {
            customer_email: "ada@example.com".to_owned(),
            success_url: "https://shop.test/paysuccess".to_owned(),
            cancel_url: "https://shop.test/cart".to_owned(),
            currency: CurrencyCode::USD,
            line_items: vec![LineItem {
                quantity: 2,
                name: "Canvas Tote".to_owned(),
                description: "Color : Navy".to_owned(),
                unit_amount: 1000,
            }],
            metadata: BTreeMap::from([("email".to_owned(), "ada@example.com".to_owned())]),
        };

        let form = session_form(&request);
        let get = |key: &str| {
            form.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][quantity]"), Some("2"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("1000"));
        assert_eq!(
            get("line_items[0][price_data][product_data][name]"),
            Some("Canvas Tote")
        );
        assert_eq!(get("metadata[email]"), Some("ada@example.com"));
    }

    #[test]
    fn test_session_form_skips_empty_description() {
        let request = CreateSessionRequest {
            customer_email: String::new(),
            success_url: String::new(),
            cancel_url: String::new(),
            currency: CurrencyCode::USD,
            line_items: vec![LineItem {
                quantity: 1,
                name: "Sticker".to_owned(),
                description: String::new(),
                unit_amount: 300,
            }],
            metadata: BTreeMap::new(),
        };

        let form = session_form(&request);
        assert!(
            !form
                .iter()
                .any(|(k, _)| k.contains("product_data][description]"))
        );
    }
}

//! Checkout session builder.
//!
//! Turns a client cart plus contact details into a hosted payment
//! session. Prices are derived exclusively from the catalog; the only
//! client influence on the gateway request is the metadata blob, which
//! carries the contact fields and the cart snapshot needed to rebuild
//! the order when the payment confirmation arrives.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use copperleaf_core::{CurrencyCode, ProductId};

use super::derive_line_item;
use crate::db::{ProductRepository, RepositoryError};
use crate::models::{CartEntry, LineItem, Product};
use crate::payments::{CheckoutSession, CreateSessionRequest, PaymentClient, PaymentError};

/// Hard cap on cart lines per checkout, to bound catalog lookups and
/// gateway request size.
pub const MAX_CART_LINES: usize = 100;

/// Checkout request body.
///
/// `cart_items` arrives as a JSON string rather than a nested array:
/// clients forward their local-storage cart verbatim, and the same
/// string representation is round-tripped through gateway metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub cart_items: String,
}

/// Errors from building a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Required contact fields were absent or empty.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The cart payload could not be used.
    #[error("invalid cart: {0}")]
    InvalidCart(String),

    /// A cart entry referenced a product that does not exist.
    #[error("unknown product: {0}")]
    UnknownProduct(String),

    /// A catalog price could not be expressed in minor units.
    #[error("unpriceable product: {0}")]
    UnpriceableProduct(ProductId),

    /// Catalog lookup failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The payment gateway rejected the session.
    #[error(transparent)]
    Gateway(#[from] PaymentError),
}

/// Builds hosted checkout sessions from client carts.
pub struct CheckoutService<'a> {
    products: ProductRepository<'a>,
    payments: &'a PaymentClient,
    base_url: &'a str,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, payments: &'a PaymentClient, base_url: &'a str) -> Self {
        Self {
            products: ProductRepository::new(pool),
            payments,
            base_url,
        }
    }

    /// Validate the request, price the cart against the catalog, and
    /// open a hosted checkout session.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for client mistakes (missing
    /// fields, malformed cart, unknown product), `Repository` for
    /// catalog failures, and `Gateway` if the payment gateway rejects
    /// the session.
    pub async fn begin(&self, request: &CheckoutRequest) -> Result<CheckoutSession, CheckoutError> {
        validate_contact(request)?;
        let entries = parse_cart(&request.cart_items)?;

        let products = self.fetch_products(&entries).await?;
        let line_items = price_entries(&entries, &products)?;

        // Canonical re-serialization, not the client's raw string, so
        // the webhook always sees a cart it can parse.
        let cart_json = serde_json::to_string(&entries)
            .map_err(|e| CheckoutError::InvalidCart(e.to_string()))?;

        let session = self
            .payments
            .create_session(&CreateSessionRequest {
                customer_email: request.email.clone(),
                success_url: format!("{}/paysuccess", self.base_url),
                cancel_url: format!("{}/cart", self.base_url),
                currency: CurrencyCode::USD,
                line_items,
                metadata: session_metadata(request, cart_json),
            })
            .await?;

        Ok(session)
    }

    async fn fetch_products(
        &self,
        entries: &[CartEntry],
    ) -> Result<HashMap<ProductId, Product>, CheckoutError> {
        let mut ids: Vec<ProductId> = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = entry
                .product_id()
                .ok_or_else(|| CheckoutError::UnknownProduct(entry.id.clone()))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let products = self.products.get_by_ids(&ids).await?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }
}

fn validate_contact(request: &CheckoutRequest) -> Result<(), CheckoutError> {
    let required = [
        ("firstName", &request.first_name),
        ("lastName", &request.last_name),
        ("email", &request.email),
        ("phone", &request.phone),
        ("address", &request.address),
        ("city", &request.city),
        ("country", &request.country),
        ("postalCode", &request.postal_code),
        ("cartItems", &request.cart_items),
    ];

    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (*name).to_owned())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(CheckoutError::MissingFields(missing))
    }
}

fn parse_cart(raw: &str) -> Result<Vec<CartEntry>, CheckoutError> {
    let entries: Vec<CartEntry> = serde_json::from_str(raw)
        .map_err(|_| CheckoutError::InvalidCart("cart items are not valid JSON".into()))?;

    if entries.is_empty() {
        return Err(CheckoutError::InvalidCart("cart is empty".into()));
    }
    if entries.len() > MAX_CART_LINES {
        return Err(CheckoutError::InvalidCart(format!(
            "cart exceeds {MAX_CART_LINES} lines"
        )));
    }
    if entries.iter().any(|entry| entry.quantity == 0) {
        return Err(CheckoutError::InvalidCart(
            "quantity must be at least 1".into(),
        ));
    }

    Ok(entries)
}

/// Price every entry, failing closed on any product the catalog does
/// not recognize. The buyer should never reach the payment page with a
/// cart the order reconciler cannot fulfil.
fn price_entries(
    entries: &[CartEntry],
    products: &HashMap<ProductId, Product>,
) -> Result<Vec<LineItem>, CheckoutError> {
    entries
        .iter()
        .map(|entry| {
            let id = entry
                .product_id()
                .ok_or_else(|| CheckoutError::UnknownProduct(entry.id.clone()))?;
            let product = products
                .get(&id)
                .ok_or_else(|| CheckoutError::UnknownProduct(entry.id.clone()))?;
            derive_line_item(product, entry).ok_or(CheckoutError::UnpriceableProduct(id))
        })
        .collect()
}

fn session_metadata(request: &CheckoutRequest, cart_json: String) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("firstName".to_owned(), request.first_name.clone()),
        ("lastName".to_owned(), request.last_name.clone()),
        ("email".to_owned(), request.email.clone()),
        ("phone".to_owned(), request.phone.clone()),
        ("address".to_owned(), request.address.clone()),
        ("address2".to_owned(), request.address2.clone()),
        ("state".to_owned(), request.state.clone()),
        ("city".to_owned(), request.city.clone()),
        ("country".to_owned(), request.country.clone()),
        ("postalCode".to_owned(), request.postal_code.clone()),
        ("cartItems".to_owned(), cart_json),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_fixtures::product;
    use super::*;

    fn full_request() -> CheckoutRequest {
        CheckoutRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Analytical Way".into(),
            address2: String::new(),
            state: "NY".into(),
            city: "New York".into(),
            country: "US".into(),
            postal_code: "10001".into(),
            cart_items: r#"[{"id":"1","quantity":2}]"#.into(),
        }
    }

    #[test]
    fn test_validate_contact_accepts_full_request() {
        assert!(validate_contact(&full_request()).is_ok());
    }

    #[test]
    fn test_validate_contact_reports_every_missing_field() {
        let request = CheckoutRequest {
            email: String::new(),
            phone: "  ".into(),
            ..full_request()
        };
        let err = validate_contact(&request).unwrap_err();
        match err {
            CheckoutError::MissingFields(fields) => {
                assert_eq!(fields, vec!["email".to_owned(), "phone".to_owned()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_contact_allows_empty_optional_fields() {
        let request = CheckoutRequest {
            address2: String::new(),
            state: String::new(),
            ..full_request()
        };
        assert!(validate_contact(&request).is_ok());
    }

    #[test]
    fn test_parse_cart_rejects_bad_json() {
        assert!(matches!(
            parse_cart("not json").unwrap_err(),
            CheckoutError::InvalidCart(_)
        ));
    }

    #[test]
    fn test_parse_cart_rejects_empty_cart() {
        assert!(matches!(
            parse_cart("[]").unwrap_err(),
            CheckoutError::InvalidCart(_)
        ));
    }

    #[test]
    fn test_parse_cart_rejects_zero_quantity() {
        assert!(matches!(
            parse_cart(r#"[{"id":"1","quantity":0}]"#).unwrap_err(),
            CheckoutError::InvalidCart(_)
        ));
    }

    #[test]
    fn test_parse_cart_rejects_oversized_cart() {
        let entries: Vec<String> = (0..=MAX_CART_LINES)
            .map(|i| format!(r#"{{"id":"{i}"}}"#))
            .collect();
        let raw = format!("[{}]", entries.join(","));
        assert!(matches!(
            parse_cart(&raw).unwrap_err(),
            CheckoutError::InvalidCart(_)
        ));
    }

    #[test]
    fn test_price_entries_fails_on_unknown_product() {
        let entries = parse_cart(r#"[{"id":"7","quantity":1}]"#).unwrap();
        let products = HashMap::from([(ProductId::new(1), product(1, "Tote", 10, 0))]);
        let err = price_entries(&entries, &products).unwrap_err();
        match err {
            CheckoutError::UnknownProduct(id) => assert_eq!(id, "7"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_price_entries_duplicate_lines_priced_independently() {
        let entries = parse_cart(
            r#"[{"id":"1","quantity":1,"properties":{"Size":"S"}},
                {"id":"1","quantity":2,"properties":{"Size":"M"}}]"#,
        )
        .unwrap();
        let products = HashMap::from([(ProductId::new(1), product(1, "Tee", 19, 99))]);

        let items = price_entries(&entries, &products).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Size : S");
        assert_eq!(items[1].description, "Size : M");
        assert!(items.iter().all(|item| item.unit_amount == 1999));
    }

    #[test]
    fn test_session_metadata_round_trips_cart() {
        let request = full_request();
        let entries = parse_cart(&request.cart_items).unwrap();
        let cart_json = serde_json::to_string(&entries).unwrap();
        let metadata = session_metadata(&request, cart_json);

        assert_eq!(metadata.get("firstName").map(String::as_str), Some("Ada"));
        assert_eq!(metadata.get("address2").map(String::as_str), Some(""));

        let restored: Vec<CartEntry> =
            serde_json::from_str(metadata.get("cartItems").unwrap()).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].quantity, 2);
    }
}

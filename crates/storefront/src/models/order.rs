//! Order domain types.
//!
//! An order is written exactly once, by the webhook reconciler, after
//! the payment gateway has confirmed payment. There is no update path
//! anywhere in the codebase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use copperleaf_core::OrderId;

/// A priced, server-derived checkout entry.
///
/// Never taken from the client: always rebuilt from a catalog lookup so
/// a tampered cart cannot change what the buyer is charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Units purchased (> 0).
    pub quantity: u32,
    /// Product title at the time of checkout.
    pub name: String,
    /// Selected properties, serialized as `"key : value, key : value"`.
    pub description: String,
    /// Per-unit price in minor currency units (cents).
    pub unit_amount: i64,
}

impl LineItem {
    /// Line total in minor units.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.unit_amount * self.quantity as i64
    }
}

/// Contact and address fields captured at checkout.
///
/// Also serves as the "shipping info" view: the most recent order's
/// details pre-fill the next checkout form. All fields are plain
/// strings and default to empty, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub address2: String,
    pub state: String,
    pub city: String,
    pub country: String,
    pub postal_code: String,
}

impl ShippingDetails {
    /// All-empty details for users with no prior orders.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A persisted, immutable order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Server-derived line items.
    pub line_items: Vec<LineItem>,
    /// Contact and address fields.
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    /// Whether the gateway reported the session as paid.
    pub paid: bool,
    /// When the order was persisted.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Order total in minor units.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.line_items.iter().map(LineItem::total).sum()
    }
}

/// An order about to be inserted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub line_items: Vec<LineItem>,
    pub shipping: ShippingDetails,
    pub paid: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_total() {
        let item = LineItem {
            quantity: 2,
            name: "Canvas Tote".into(),
            description: String::new(),
            unit_amount: 1000,
        };
        assert_eq!(item.total(), 2000);
    }

    #[test]
    fn test_order_total_sums_line_totals() {
        let order = Order {
            id: OrderId::new(1),
            line_items: vec![
                LineItem {
                    quantity: 2,
                    name: "Canvas Tote".into(),
                    description: String::new(),
                    unit_amount: 1000,
                },
                LineItem {
                    quantity: 1,
                    name: "Sticker".into(),
                    description: String::new(),
                    unit_amount: 350,
                },
            ],
            shipping: ShippingDetails::empty(),
            paid: true,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(order.total(), 2350);
    }

    #[test]
    fn test_shipping_details_empty_has_no_nulls() {
        let json = serde_json::to_value(ShippingDetails::empty()).unwrap();
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 10);
        for (key, value) in map {
            assert_eq!(value.as_str(), Some(""), "field {key} should be an empty string");
        }
    }

    #[test]
    fn test_shipping_details_wire_field_names() {
        let details = ShippingDetails {
            first_name: "Ada".into(),
            postal_code: "10001".into(),
            ..ShippingDetails::empty()
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["postalCode"], "10001");
    }
}

//! Client-held cart representation.
//!
//! Carts are never stored server-side: the client keeps a list of
//! product selections in local storage and sends it with cart-page and
//! checkout requests. Duplicate entries are legal and represent
//! quantity; the server treats each entry as its own prospective line
//! item.

use serde::{Deserialize, Serialize};

use copperleaf_core::{ProductId, PropertyMap};

/// One client-side cart entry: a product reference plus the buyer's
/// selected properties.
///
/// The `id` stays a string on the wire (clients round-trip it through
/// local storage and gateway metadata); [`CartEntry::product_id`] parses
/// it on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product reference as the client sent it.
    pub id: String,
    /// Requested quantity (defaults to 1).
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Selected property name -> value(s).
    #[serde(default)]
    pub properties: PropertyMap,
}

const fn default_quantity() -> u32 {
    1
}

impl CartEntry {
    /// Parse the client-supplied id into a catalog ID.
    ///
    /// Returns `None` for ids that cannot reference any product.
    #[must_use]
    pub fn product_id(&self) -> Option<ProductId> {
        self.id.parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use copperleaf_core::PropertyValue;

    #[test]
    fn test_deserialize_full_entry() {
        let entry: CartEntry =
            serde_json::from_str(r#"{"id":"3","quantity":2,"properties":{"Size":"XL"}}"#).unwrap();
        assert_eq!(entry.product_id(), Some(ProductId::new(3)));
        assert_eq!(entry.quantity, 2);
        assert_eq!(
            entry.properties.get("Size"),
            Some(&PropertyValue::Scalar("XL".into()))
        );
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let entry: CartEntry = serde_json::from_str(r#"{"id":"3"}"#).unwrap();
        assert_eq!(entry.quantity, 1);
        assert!(entry.properties.is_empty());
    }

    #[test]
    fn test_unparseable_id_yields_no_product() {
        let entry: CartEntry = serde_json::from_str(r#"{"id":"not-a-product"}"#).unwrap();
        assert_eq!(entry.product_id(), None);
    }
}

//! Cart resolution route handler.
//!
//! The cart lives in the client; this endpoint turns its product
//! references into current catalog data so the cart page can render
//! titles, images, and prices it can trust.

use std::collections::HashMap;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use copperleaf_core::{ProductId, PropertyMap};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::{CartEntry, Product};
use crate::state::AppState;

/// Cart resolution request body.
#[derive(Debug, Deserialize)]
pub struct CartRequest {
    /// The client's cart entries.
    pub items: Vec<CartEntry>,
}

/// One resolved cart line: the catalog product as it stands now, plus
/// the buyer's selections.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub product: Product,
    /// The buyer's selected properties for this line.
    pub selected_properties: PropertyMap,
    /// Requested quantity.
    pub quantity: u32,
}

/// Resolve a client cart against the catalog.
///
/// Entries whose product no longer exists (or whose id is garbage) are
/// silently dropped so a stale cart still renders; only a cart with no
/// resolvable entries at all is rejected.
///
/// # Route
///
/// `POST /cart`
pub async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<CartRequest>,
) -> Result<Json<Vec<CartLine>>, AppError> {
    let entries = request.items;
    let ids: Vec<ProductId> = entries.iter().filter_map(CartEntry::product_id).collect();
    if ids.is_empty() {
        return Err(AppError::BadRequest("no valid product IDs provided".into()));
    }

    let products: HashMap<ProductId, Product> = ProductRepository::new(state.pool())
        .get_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines: Vec<CartLine> = entries
        .into_iter()
        .filter_map(|entry| {
            let product = entry
                .product_id()
                .and_then(|id| products.get(&id))
                .cloned()?;
            Some(CartLine {
                product,
                selected_properties: entry.properties,
                quantity: entry.quantity,
            })
        })
        .collect();

    if lines.is_empty() {
        return Err(AppError::BadRequest("no valid product IDs provided".into()));
    }

    Ok(Json(lines))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use copperleaf_core::ProductId;

    use super::*;

    #[test]
    fn test_request_body_wraps_entries_in_items() {
        let request: CartRequest =
            serde_json::from_str(r#"{"items":[{"id":"1","quantity":1,"properties":{}}]}"#)
                .unwrap();
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].product_id(), Some(ProductId::new(1)));
    }

    #[test]
    fn test_request_body_rejects_bare_array() {
        assert!(serde_json::from_str::<CartRequest>(r#"[{"id":"1"}]"#).is_err());
    }
}

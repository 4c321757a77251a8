//! Catalog product domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use copperleaf_core::{CategoryId, Price, ProductId, PropertyMap};

/// A catalog product.
///
/// The catalog is the authoritative source for prices: anything the
/// client claims about cost is discarded and re-derived from this type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title (becomes the line-item name at checkout).
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Image URLs.
    pub images: Vec<String>,
    /// Authoritative price in standard currency units.
    pub price: Price,
    /// Optional category reference.
    pub category_id: Option<CategoryId>,
    /// Property name -> allowed value(s).
    pub properties: PropertyMap,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use copperleaf_core::{CategoryId, ProductId};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to one category.
    pub category: Option<CategoryId>,
}

/// List products, optionally filtered by category, newest first.
///
/// # Route
///
/// `GET /products`
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let repo = ProductRepository::new(state.pool());
    let products = match query.category {
        Some(category_id) => repo.list_by_category(category_id).await?,
        None => repo.list().await?,
    };
    Ok(Json(products))
}

/// Fetch a single product by ID.
///
/// # Route
///
/// `GET /products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".into()))?;
    Ok(Json(product))
}

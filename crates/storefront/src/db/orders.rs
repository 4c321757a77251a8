//! Order repository.
//!
//! The webhook reconciler is the sole writer; every other caller is
//! read-only. Rows are never updated or deleted, so "insert one row"
//! is the only write path in the whole system.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use copperleaf_core::{Email, OrderId};

use super::RepositoryError;
use crate::models::{LineItem, NewOrder, Order, ShippingDetails};

const ORDER_COLUMNS: &str = "id, line_items, first_name, last_name, email, phone, \
     address, address2, state, city, country, postal_code, paid, created_at";

/// Raw order row, decoded into the domain type after JSONB parsing.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    line_items: serde_json::Value,
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    address: String,
    address2: String,
    state: String,
    city: String,
    country: String,
    postal_code: String,
    paid: bool,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let line_items: Vec<LineItem> = serde_json::from_value(self.line_items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid line items for order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            line_items,
            shipping: ShippingDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                address: self.address,
                address2: self.address2,
                state: self.state,
                city: self.city,
                country: self.country,
                postal_code: self.postal_code,
            },
            paid: self.paid,
            created_at: self.created_at,
        })
    }
}

/// Repository for order persistence and history queries.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one order and return the persisted record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (the
    /// webhook handler surfaces this as a 5xx so the gateway redelivers
    /// the event).
    pub async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let line_items = serde_json::to_value(&order.line_items).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable line items: {e}"))
        })?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO storefront.customer_order \
                 (line_items, first_name, last_name, email, phone, \
                  address, address2, state, city, country, postal_code, paid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(line_items)
        .bind(&order.shipping.first_name)
        .bind(&order.shipping.last_name)
        .bind(&order.shipping.email)
        .bind(&order.shipping.phone)
        .bind(&order.shipping.address)
        .bind(&order.shipping.address2)
        .bind(&order.shipping.state)
        .bind(&order.shipping.city)
        .bind(&order.shipping.country)
        .bind(&order.shipping.postal_code)
        .bind(order.paid)
        .fetch_one(self.pool)
        .await?;

        row.into_order()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn list_by_email(&self, email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order \
             WHERE email = $1 ORDER BY created_at DESC"
        ))
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// Get a user's most recent order, if any.
    ///
    /// Backs the shipping-info endpoint: the latest order's contact and
    /// address fields pre-fill the next checkout form.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored value is invalid.
    pub async fn last_by_email(&self, email: &Email) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order \
             WHERE email = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }
}

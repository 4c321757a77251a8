//! Database operations for storefront `PostgreSQL`.
//!
//! # Tables (schema `storefront`)
//!
//! - `product`, `category` - the catalog (read-only from the checkout flow)
//! - `customer_order` - immutable orders, written only by the reconciler
//! - tower-sessions storage (managed by the session store itself)
//!
//! # Migrations
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded
//! with `sqlx::migrate!`; the binary applies them at startup.

pub mod orders;
pub mod products;

pub use orders::OrderRepository;
pub use products::ProductRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply embedded migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

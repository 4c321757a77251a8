//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::payments::PaymentClient;
use crate::services::GoogleClient;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    payments: PaymentClient,
    google: GoogleClient,
}

impl AppState {
    /// Assemble application state from loaded configuration and an
    /// established database pool.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let payments = PaymentClient::new(&config.payments);
        let google = GoogleClient::new(&config.google);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                google,
            }),
        }
    }

    /// Application configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Payment gateway client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Google OAuth client.
    #[must_use]
    pub fn google(&self) -> &GoogleClient {
        &self.inner.google
    }

    /// Public base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.config.base_url.trim_end_matches('/')
    }
}

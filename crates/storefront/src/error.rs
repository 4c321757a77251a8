//! Application error handling.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse`
//! impl maps each variant to a status code and a `{"error": ...}` JSON
//! body. Server-side failures are reported to Sentry before the
//! response is built; client mistakes are not.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::payments::PaymentError;
use crate::services::{AuthError, CheckoutError, ReconcileError};

/// Application-level error type for all route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database or stored-data failure.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment gateway call failed server-side.
    #[error("payment gateway error: {0}")]
    Payment(String),

    /// Request failed validation; each entry names one problem.
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Request was malformed or referenced something unusable.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Authentication required or failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Webhook signature did not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Anything else that should read as a 500.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::MissingFields(fields) => Self::Validation(
                fields
                    .into_iter()
                    .map(|field| format!("missing required field: {field}"))
                    .collect(),
            ),
            CheckoutError::InvalidCart(reason) => Self::BadRequest(format!("invalid cart: {reason}")),
            // The original storefront treated an unknown product in the
            // cart as a plain bad request, not a 404.
            CheckoutError::UnknownProduct(id) => Self::BadRequest(format!("unknown product: {id}")),
            CheckoutError::UnpriceableProduct(id) => {
                Self::Internal(format!("price out of range for product {id}"))
            }
            CheckoutError::Repository(err) => Self::Database(err),
            CheckoutError::Gateway(err) => Self::from(err),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidSignature(reason) => Self::InvalidSignature(reason),
            PaymentError::Parse(err) => Self::BadRequest(format!("unparseable payload: {err}")),
            PaymentError::Http(_) | PaymentError::Api(_) => Self::Payment(err.to_string()),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::InvalidMetadata(reason) => Self::BadRequest(reason),
            ReconcileError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Http(err) => Self::Internal(format!("identity provider request: {err}")),
            AuthError::Provider(reason) => Self::Unauthorized(reason),
            AuthError::MissingEmail => Self::Unauthorized(err.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session store: {err}"))
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::InvalidSignature(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            Self::Validation(problems) => json!({
                "error": "validation failed",
                "details": problems,
            }),
            Self::BadRequest(reason) => json!({ "error": reason }),
            Self::NotFound(what) => json!({ "error": format!("{what} not found") }),
            Self::Unauthorized(_) => json!({ "error": "authentication required" }),
            Self::InvalidSignature(_) => json!({ "error": "invalid signature" }),
            // Internals are logged, never leaked.
            Self::Database(_) | Self::Internal(_) => json!({ "error": "internal server error" }),
            Self::Payment(_) => json!({ "error": "payment gateway unavailable" }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(err) => {
                tracing::error!(error = %err, "database error");
                sentry::capture_error(err);
            }
            Self::Internal(reason) => {
                tracing::error!(%reason, "internal error");
                sentry::capture_message(reason, sentry::Level::Error);
            }
            Self::Payment(reason) => {
                tracing::error!(%reason, "payment gateway error");
                sentry::capture_message(reason, sentry::Level::Error);
            }
            Self::InvalidSignature(reason) => {
                tracing::warn!(%reason, "rejected webhook signature");
            }
            _ => {}
        }

        (self.status(), Json(self.body())).into_response()
    }
}

//! Business logic for checkout, order reconciliation, and sign-in.
//!
//! Route handlers stay thin; the rules live here. The one rule shared
//! across modules is [`derive_line_item`]: both the checkout builder
//! and the webhook reconciler price a cart entry through it, so the
//! order written after payment always matches what the buyer was
//! quoted.

pub mod checkout;
pub mod google;
pub mod reconciler;

pub use checkout::{CheckoutError, CheckoutRequest, CheckoutService};
pub use google::{AuthError, GoogleClient, GoogleUser};
pub use reconciler::{ReconcileError, ReconciliationCommand};

use copperleaf_core::format_selected_properties;

use crate::models::{CartEntry, LineItem, Product};

/// Price one cart entry against its catalog product.
///
/// The name and unit price come from the catalog row, never from the
/// client. The description is the buyer's selected properties rendered
/// as `"key : value, key : value"`.
///
/// Returns `None` if the catalog price cannot be expressed in minor
/// units.
pub(crate) fn derive_line_item(product: &Product, entry: &CartEntry) -> Option<LineItem> {
    let unit_amount = product.price.minor_units()?;
    Some(LineItem {
        quantity: entry.quantity,
        name: product.title.clone(),
        description: format_selected_properties(&entry.properties),
        unit_amount,
    })
}

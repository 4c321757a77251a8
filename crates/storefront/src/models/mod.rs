//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;

pub use cart::CartEntry;
pub use order::{LineItem, NewOrder, Order, ShippingDetails};
pub use product::Product;
pub use session::CurrentUser;
pub use session::keys as session_keys;

//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use copperleaf_core::Email;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
/// Established by the Google OAuth callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Verified email address from the identity provider.
    pub email: Email,
    /// Display name, if the provider supplied one.
    pub name: Option<String>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the OAuth state parameter (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}

//! Google OAuth route handlers.
//!
//! Handles the sign-in flow:
//! - Login: redirects to Google's consent screen
//! - Callback: validates state, exchanges the code, stores the identity
//! - Logout: clears the session

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use copperleaf_core::Email;

use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

fn callback_uri(state: &AppState) -> String {
    format!("{}/auth/google/callback", state.base_url())
}

/// Initiate Google OAuth login.
///
/// Generates a CSRF state parameter, stores it in the session, and
/// redirects to Google's consent screen.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    // Stored for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    let auth_url = state
        .google()
        .authorization_url(&callback_uri(&state), &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code for
/// the user's identity, and stores it in the session.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Redirect::to("/?error=google_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to("/?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Redirect::to("/?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to("/?error=invalid_state").into_response();
    }

    // One-time use
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    let user = match state
        .google()
        .exchange_code(&code, &callback_uri(&state))
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Failed to exchange Google OAuth code: {}", e);
            return Redirect::to("/?error=token_exchange").into_response();
        }
    };

    let email = match Email::parse(&user.email) {
        Ok(email) => email,
        Err(e) => {
            tracing::error!("Google returned an unusable email: {}", e);
            return Redirect::to("/?error=invalid_email").into_response();
        }
    };

    let current = CurrentUser {
        email,
        name: user.name,
    };
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to store user in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    tracing::info!("user authenticated via Google");

    Redirect::to("/").into_response()
}

/// Log the current user out.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Response {
    let _ = clear_current_user(&session).await;
    Redirect::to("/").into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string_length_and_charset() {
        let s = generate_random_string(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_random_string_is_not_constant() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}

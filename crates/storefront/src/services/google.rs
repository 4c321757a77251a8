//! Google OAuth 2.0 sign-in client.
//!
//! Standard authorization-code flow: redirect the browser to Google,
//! exchange the returned code for an access token, then fetch the
//! OpenID userinfo document for the verified email. The storefront
//! never sees a password; the session only stores the resulting
//! identity.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleOAuthConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Errors from the sign-in flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request to Google failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google returned an error response.
    #[error("identity provider error: {0}")]
    Provider(String),

    /// The userinfo document had no usable email.
    #[error("identity provider returned no email")]
    MissingEmail,
}

/// Identity returned by Google after a successful code exchange.
#[derive(Debug, Clone)]
pub struct GoogleUser {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserinfoResponse {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Client for Google's OAuth endpoints.
pub struct GoogleClient {
    http: Client,
    client_id: String,
    client_secret: SecretString,
}

impl GoogleClient {
    /// Create a new Google OAuth client from configuration.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            http: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Build the consent-screen URL the browser is redirected to.
    ///
    /// `state` is the per-session CSRF token; the callback handler must
    /// see the same value come back.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state)
            .finish();
        format!("{AUTHORIZATION_ENDPOINT}?{query}")
    }

    /// Exchange an authorization code for the user's identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Http` on transport failure,
    /// `AuthError::Provider` if Google rejects the code, and
    /// `AuthError::MissingEmail` if the userinfo document lacks an
    /// email.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<GoogleUser, AuthError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Provider(format!(
                "userinfo fetch failed with status {}",
                response.status()
            )));
        }
        let userinfo: UserinfoResponse = response.json().await?;

        let email = userinfo.email.ok_or(AuthError::MissingEmail)?;
        Ok(GoogleUser {
            email,
            name: userinfo.name,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;

    fn test_client() -> GoogleClient {
        GoogleClient::new(&GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_owned(),
            client_secret: SecretString::from("GOCSPX-kYqzAhR4wNuBp2T"),
        })
    }

    #[test]
    fn test_authorization_url_carries_required_parameters() {
        let url = test_client()
            .authorization_url("https://shop.test/api/auth/google/callback", "state-xyz");
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("accounts.google.com"));
        assert_eq!(
            pairs.get("client_id").map(String::as_str),
            Some("client-123.apps.googleusercontent.com")
        );
        assert_eq!(
            pairs.get("redirect_uri").map(String::as_str),
            Some("https://shop.test/api/auth/google/callback")
        );
        assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
        assert_eq!(
            pairs.get("scope").map(String::as_str),
            Some("openid email profile")
        );
        assert_eq!(pairs.get("state").map(String::as_str), Some("state-xyz"));
    }

    #[test]
    fn test_authorization_url_encodes_state() {
        let url = test_client().authorization_url("https://shop.test/cb", "a b&c");
        let parsed = Url::parse(&url).unwrap();
        let state = parsed
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned());
        assert_eq!(state.as_deref(), Some("a b&c"));
    }
}

//! OAuth provider trait and types.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Result of a successful authorization code exchange.
#[derive(Debug)]
pub struct Credentials {
    access_token: SecretString,
    /// Provider's stable identifier for the user (the `sub` claim).
    pub subject: String,
    pub token_type: String,
    pub expires_in: Option<i64>,
}

impl Credentials {
    pub fn new(
        access_token: String,
        subject: String,
        token_type: String,
        expires_in: Option<i64>,
    ) -> Self {
        Self {
            access_token: SecretString::new(access_token),
            subject,
            token_type,
            expires_in,
        }
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Access token introspection result.
///
/// The provider reports problems in-band through `error`, so every field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TokenInfo {
    /// Client ID the token was issued to.
    pub issued_to: Option<String>,
    pub audience: Option<String>,
    /// Provider's identifier for the user the token belongs to.
    pub user_id: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<i64>,
    pub email: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// User profile returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
}

/// Trait for OAuth 2.0 identity providers.
///
/// Each method is one outbound request with no local state. Network
/// failures, timeouts and malformed responses are reported as the error kind
/// of the method that failed.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Client ID this application is registered under with the provider.
    fn client_id(&self) -> &str;

    /// Exchange a one-time authorization code for credentials.
    ///
    /// Fails with `OAuthErrorKind::ExchangeFailed`.
    async fn exchange_code(&self, code: &str) -> Result<Credentials, Error>;

    /// Introspect an access token.
    ///
    /// Fails with `OAuthErrorKind::InvalidToken`, including when the provider
    /// answers with an `error` field.
    async fn verify_token(&self, access_token: &str) -> Result<TokenInfo, Error>;

    /// Fetch the profile of the user the access token belongs to.
    ///
    /// Fails with `OAuthErrorKind::ProfileFetchFailed`.
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error>;

    /// Revoke an access token. Only an HTTP 200 from the provider counts as
    /// success.
    ///
    /// Fails with `OAuthErrorKind::RevokeFailed`.
    async fn revoke(&self, access_token: &str) -> Result<(), Error>;
}

//! Google OAuth client.
//!
//! Builds the Google identity provider from the service configuration.

use std::time::Duration;

use provider_auth::http::HttpClientConfig;
use provider_auth::oauth::providers::google::{Endpoints, Provider as GoogleProvider};
use service::config::Config;

use crate::error::Error;

/// Create a Google OAuth provider from `config`.
///
/// Fails with a config error when the client ID or secret is missing. The
/// server still starts in that case and logs the problem, so only login and
/// logout requests that get past their session checks see this error.
///
/// # Example
///
/// ```rust,ignore
/// use domain::gateway::google;
///
/// let provider = google::new_provider(&config)?;
/// ```
pub fn new_provider(config: &Config) -> Result<GoogleProvider, Error> {
    let client_id = config
        .google_client_id()
        .ok_or_else(|| Error::config("Google client ID is not configured"))?;
    let client_secret = config
        .google_client_secret()
        .ok_or_else(|| Error::config("Google client secret is not configured"))?;

    let endpoints = Endpoints {
        token_url: config.google_token_url().to_string(),
        tokeninfo_url: config.google_tokeninfo_url().to_string(),
        userinfo_url: config.google_userinfo_url().to_string(),
        revoke_url: config.google_revoke_url().to_string(),
    };
    let http = HttpClientConfig::default()
        .with_timeout(Duration::from_secs(config.provider_timeout_secs));

    Ok(GoogleProvider::new(
        client_id,
        client_secret,
        config.google_redirect_uri().to_string(),
        endpoints,
        &http,
    )?)
}

//! Google OAuth provider implementation.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::*;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{oauth_error, oauth_error_from, Error, OAuthErrorKind};
use crate::http::HttpClientConfig;
use crate::oauth::{Credentials, Profile, TokenInfo};

/// Google endpoint URLs. Configurable so tests can target a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub token_url: String,
    pub tokeninfo_url: String,
    pub userinfo_url: String,
    pub revoke_url: String,
}

/// Google OAuth provider.
///
/// Handles the server side of Google Sign-In:
/// - Authorization code exchange (with the `postmessage` redirect URI used by
///   the client-side sign-in widget)
/// - Access token introspection via the tokeninfo endpoint
/// - User info retrieval
/// - Token revocation
pub struct Provider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    endpoints: Endpoints,
    http_client: reqwest::Client,
}

/// Request to exchange authorization code for tokens
#[derive(Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

/// OAuth token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    expires_in: Option<i64>,
    id_token: Option<String>,
}

/// The claims we read from the id_token payload.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Google OAuth client ID
    /// * `client_secret` - Google OAuth client secret
    /// * `redirect_uri` - Redirect URI sent with the code exchange
    /// * `endpoints` - Google endpoint URLs
    /// * `http` - Outbound client settings (timeout, user agent)
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        endpoints: Endpoints,
        http: &HttpClientConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret),
            redirect_uri,
            endpoints,
            http_client: http.build()?,
        })
    }
}

/// Reads the `sub` claim from the payload segment of an id_token.
///
/// The signature is not checked: the token comes straight from Google's token
/// endpoint over TLS, and the subject is cross-checked against the tokeninfo
/// endpoint afterwards.
fn subject_from_id_token(id_token: &str) -> Result<String, Error> {
    let payload = id_token.split('.').nth(1).ok_or_else(|| {
        oauth_error(
            OAuthErrorKind::ExchangeFailed,
            "id_token is not a JWT",
        )
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| oauth_error_from(OAuthErrorKind::ExchangeFailed, e))?;

    let claims: IdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| oauth_error_from(OAuthErrorKind::ExchangeFailed, e))?;

    Ok(claims.sub)
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn client_id(&self) -> &str {
        &self.client_id
    }

    async fn exchange_code(&self, code: &str) -> Result<Credentials, Error> {
        let request = TokenExchangeRequest {
            code,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            redirect_uri: &self.redirect_uri,
            grant_type: "authorization_code",
        };

        debug!("Exchanging Google OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange Google OAuth code: {:?}", e);
                oauth_error_from(OAuthErrorKind::ExchangeFailed, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google OAuth code exchange rejected ({status}): {error_text}");
            return Err(oauth_error(
                OAuthErrorKind::ExchangeFailed,
                &format!("token endpoint returned {status}: {error_text}"),
            ));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token response: {:?}", e);
            oauth_error_from(OAuthErrorKind::ExchangeFailed, e)
        })?;

        let id_token = tokens.id_token.ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::ExchangeFailed,
                "token response has no id_token",
            )
        })?;
        let subject = subject_from_id_token(&id_token)?;

        info!("Successfully exchanged Google OAuth code for tokens");
        Ok(Credentials::new(
            tokens.access_token,
            subject,
            tokens.token_type,
            tokens.expires_in,
        ))
    }

    async fn verify_token(&self, access_token: &str) -> Result<TokenInfo, Error> {
        let response = self
            .http_client
            .get(&self.endpoints.tokeninfo_url)
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google tokeninfo: {:?}", e);
                oauth_error_from(OAuthErrorKind::InvalidToken, e)
            })?;

        // Google reports a bad token with a 400 and a JSON error body, so the
        // body is parsed before the status is considered.
        let status = response.status();
        let token_info: TokenInfo = response.json().await.map_err(|e| {
            warn!("Failed to parse Google tokeninfo response: {:?}", e);
            oauth_error_from(OAuthErrorKind::InvalidToken, e)
        })?;

        if let Some(error) = &token_info.error {
            warn!(
                "Google tokeninfo reported an error: {error} {}",
                token_info.error_description.as_deref().unwrap_or_default()
            );
            return Err(oauth_error(OAuthErrorKind::InvalidToken, error));
        }

        if !status.is_success() {
            return Err(oauth_error(
                OAuthErrorKind::InvalidToken,
                &format!("tokeninfo endpoint returned {status}"),
            ));
        }

        Ok(token_info)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, Error> {
        let response = self
            .http_client
            .get(&self.endpoints.userinfo_url)
            .query(&[("alt", "json")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get Google user info: {:?}", e);
                oauth_error_from(OAuthErrorKind::ProfileFetchFailed, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google user info error ({status}): {error_text}");
            return Err(oauth_error(
                OAuthErrorKind::ProfileFetchFailed,
                &format!("userinfo endpoint returned {status}: {error_text}"),
            ));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Google user info: {:?}", e);
            oauth_error_from(OAuthErrorKind::ProfileFetchFailed, e)
        })
    }

    async fn revoke(&self, access_token: &str) -> Result<(), Error> {
        let response = self
            .http_client
            .get(&self.endpoints.revoke_url)
            .query(&[("token", access_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google revoke endpoint: {:?}", e);
                oauth_error_from(OAuthErrorKind::RevokeFailed, e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token revocation failed ({status}): {error_text}");
            return Err(oauth_error(
                OAuthErrorKind::RevokeFailed,
                &format!("revoke endpoint returned {status}"),
            ));
        }

        info!("Revoked Google access token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::oauth::Provider as _;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    const CLIENT_ID: &str = "client-123.apps.googleusercontent.com";

    fn provider_for(server: &ServerGuard) -> Provider {
        let base = server.url();
        Provider::new(
            CLIENT_ID.to_string(),
            "shh".to_string(),
            "postmessage".to_string(),
            Endpoints {
                token_url: format!("{base}/token"),
                tokeninfo_url: format!("{base}/tokeninfo"),
                userinfo_url: format!("{base}/userinfo"),
                revoke_url: format!("{base}/revoke"),
            },
            &HttpClientConfig::default(),
        )
        .unwrap()
    }

    fn id_token_for(sub: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            json!({"sub": sub, "aud": CLIENT_ID, "email": "ada@example.com"}).to_string(),
        );
        format!("{header}.{payload}.signature")
    }

    fn oauth_kind(err: Error) -> OAuthErrorKind {
        match err.error_kind {
            ErrorKind::OAuth(kind) => kind,
            other => panic!("expected an OAuth error, got {other:?}"),
        }
    }

    #[test]
    fn subject_from_id_token_reads_sub_claim() {
        assert_eq!(
            subject_from_id_token(&id_token_for("110169484474386276334")).unwrap(),
            "110169484474386276334"
        );
    }

    #[test]
    fn subject_from_id_token_rejects_garbage() {
        let err = subject_from_id_token("not-a-jwt").unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeFailed);
    }

    #[tokio::test]
    async fn exchange_code_returns_credentials_with_subject() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code".into(), "4/auth-code".into()),
                Matcher::UrlEncoded("client_id".into(), CLIENT_ID.into()),
                Matcher::UrlEncoded("redirect_uri".into(), "postmessage".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "ya29.token",
                    "token_type": "Bearer",
                    "expires_in": 3599,
                    "id_token": id_token_for("sub-1"),
                })
                .to_string(),
            )
            .create_async()
            .await;

        let credentials = provider_for(&server)
            .exchange_code("4/auth-code")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(credentials.access_token(), "ya29.token");
        assert_eq!(credentials.subject, "sub-1");
        assert_eq!(credentials.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn exchange_code_rejected_code_is_exchange_failed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let err = provider_for(&server)
            .exchange_code("used-code")
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeFailed);
    }

    #[tokio::test]
    async fn exchange_code_without_id_token_is_exchange_failed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.token", "token_type": "Bearer"}"#)
            .create_async()
            .await;

        let err = provider_for(&server)
            .exchange_code("4/auth-code")
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeFailed);
    }

    #[tokio::test]
    async fn exchange_code_network_failure_is_exchange_failed() {
        let provider = Provider::new(
            CLIENT_ID.to_string(),
            "shh".to_string(),
            "postmessage".to_string(),
            Endpoints {
                // Nothing listens on port 1
                token_url: "http://127.0.0.1:1/token".to_string(),
                tokeninfo_url: "http://127.0.0.1:1/tokeninfo".to_string(),
                userinfo_url: "http://127.0.0.1:1/userinfo".to_string(),
                revoke_url: "http://127.0.0.1:1/revoke".to_string(),
            },
            &HttpClientConfig::default(),
        )
        .unwrap();

        let err = provider.exchange_code("4/auth-code").await.unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeFailed);

        let err = provider.revoke("ya29.token").await.unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::RevokeFailed);
    }

    #[tokio::test]
    async fn verify_token_returns_token_info() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(Matcher::UrlEncoded(
                "access_token".into(),
                "ya29.token".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "issued_to": CLIENT_ID,
                    "audience": CLIENT_ID,
                    "user_id": "sub-1",
                    "scope": "openid email profile",
                    "expires_in": 3500,
                    "email": "ada@example.com",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let info = provider_for(&server)
            .verify_token("ya29.token")
            .await
            .unwrap();

        assert_eq!(info.issued_to.as_deref(), Some(CLIENT_ID));
        assert_eq!(info.user_id.as_deref(), Some("sub-1"));
    }

    #[tokio::test]
    async fn verify_token_error_field_is_invalid_token() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "invalid_token", "error_description": "Invalid Value"}"#)
            .create_async()
            .await;

        let err = provider_for(&server)
            .verify_token("expired")
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::InvalidToken);
    }

    #[tokio::test]
    async fn verify_token_malformed_body_is_invalid_token() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tokeninfo")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = provider_for(&server)
            .verify_token("ya29.token")
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::InvalidToken);
    }

    #[tokio::test]
    async fn fetch_profile_returns_profile() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .match_query(Matcher::UrlEncoded("alt".into(), "json".into()))
            .match_header("authorization", "Bearer ya29.token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "sub-1",
                    "name": "Ada Lovelace",
                    "given_name": "Ada",
                    "email": "ada@example.com",
                    "picture": "https://example.com/ada.png",
                })
                .to_string(),
            )
            .create_async()
            .await;

        let profile = provider_for(&server)
            .fetch_profile("ya29.token")
            .await
            .unwrap();

        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(profile.given_name.as_deref(), Some("Ada"));
        assert_eq!(profile.email, "ada@example.com");
    }

    #[tokio::test]
    async fn fetch_profile_server_error_is_profile_fetch_failed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let err = provider_for(&server)
            .fetch_profile("ya29.token")
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ProfileFetchFailed);
    }

    #[tokio::test]
    async fn revoke_succeeds_only_on_200() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/revoke")
            .match_query(Matcher::UrlEncoded("token".into(), "good".into()))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/revoke")
            .match_query(Matcher::UrlEncoded("token".into(), "bad".into()))
            .with_status(400)
            .with_body(r#"{"error": "invalid_token"}"#)
            .create_async()
            .await;

        let provider = provider_for(&server);

        assert!(provider.revoke("good").await.is_ok());
        let err = provider.revoke("bad").await.unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::RevokeFailed);
    }
}

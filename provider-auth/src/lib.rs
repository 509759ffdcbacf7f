//! # provider-auth
//!
//! Client side of the OAuth 2.0 login handshake with an external identity
//! provider:
//! - Authorization code exchange for credentials
//! - Access token introspection
//! - User profile retrieval
//! - Token revocation
//! - State token generation for CSRF protection of the handshake
//!
//! Every call is an independent outbound request; nothing here keeps state
//! between calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use provider_auth::http::HttpClientConfig;
//! use provider_auth::oauth::{providers::google, Provider};
//!
//! let provider = google::Provider::new(
//!     client_id,
//!     client_secret,
//!     "postmessage".to_string(),
//!     endpoints,
//!     &HttpClientConfig::default(),
//! )?;
//! let credentials = provider.exchange_code(&code).await?;
//! let token_info = provider.verify_token(credentials.access_token()).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use provider_auth::error::{Error as ProviderAuthError, ErrorKind as ProviderAuthErrorKind};
use provider_auth::error::OAuthErrorKind;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree with `domain::error::Error`
/// as the root holding a tree of `error_kind` enums for the failures that can
/// occur here or in the layers below. The `source` field keeps the original
/// error. `web` depends on `domain` only, never directly on `entity_api` or
/// `provider-auth`, so every lower-layer error is translated here and `web`
/// maps the resulting kinds onto HTTP status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    Login(LoginErrorKind),
    Access(AccessErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Entity errors bubbled up from `entity_api`, reduced to what the domain
/// layer cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    DbTransaction,
}

/// Failures of the login handshake. Each one ends the request; none is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginErrorKind {
    InvalidStateToken,
    ExchangeFailed,
    InvalidToken,
    TokenSubjectMismatch,
    TokenAudienceMismatch,
    NotConnected,
    DisconnectFailed,
    ProfileFetchFailed,
}

impl LoginErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            LoginErrorKind::InvalidStateToken => "invalid_state_token",
            LoginErrorKind::ExchangeFailed => "exchange_failed",
            LoginErrorKind::InvalidToken => "invalid_token",
            LoginErrorKind::TokenSubjectMismatch => "token_subject_mismatch",
            LoginErrorKind::TokenAudienceMismatch => "token_audience_mismatch",
            LoginErrorKind::NotConnected => "not_connected",
            LoginErrorKind::DisconnectFailed => "disconnect_failed",
            LoginErrorKind::ProfileFetchFailed => "profile_fetch_failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LoginErrorKind::InvalidStateToken => "Invalid state parameter.",
            LoginErrorKind::ExchangeFailed => "Failed to upgrade the authorization code.",
            LoginErrorKind::InvalidToken => "The access token is not valid.",
            LoginErrorKind::TokenSubjectMismatch => {
                "Token's user ID doesn't match given user ID."
            }
            LoginErrorKind::TokenAudienceMismatch => {
                "Token's client ID does not match this application's."
            }
            LoginErrorKind::NotConnected => "Current user not connected.",
            LoginErrorKind::DisconnectFailed => "Failed to revoke token for given user.",
            LoginErrorKind::ProfileFetchFailed => "Failed to fetch the user profile.",
        }
    }
}

/// Authorization failures for operations that need a logged in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessErrorKind {
    Unauthenticated,
}

impl AccessErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            AccessErrorKind::Unauthenticated => "unauthenticated",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AccessErrorKind::Unauthenticated => "You must be logged in.",
        }
    }
}

impl Error {
    pub fn login(kind: LoginErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Login(kind),
        }
    }

    pub fn access(kind: AccessErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Access(kind),
        }
    }

    pub fn config(message: &str) -> Self {
        Error {
            source: Some(message.to_string().into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::RecordAlreadyExists => EntityErrorKind::Invalid,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

// Each provider operation reports its own kind, which lines up with one step
// of the login handshake.
impl From<ProviderAuthError> for Error {
    fn from(err: ProviderAuthError) -> Self {
        let error_kind = match &err.error_kind {
            ProviderAuthErrorKind::OAuth(kind) => DomainErrorKind::Login(match kind {
                OAuthErrorKind::ExchangeFailed => LoginErrorKind::ExchangeFailed,
                OAuthErrorKind::InvalidToken => LoginErrorKind::InvalidToken,
                OAuthErrorKind::ProfileFetchFailed => LoginErrorKind::ProfileFetchFailed,
                OAuthErrorKind::RevokeFailed => LoginErrorKind::DisconnectFailed,
            }),
            ProviderAuthErrorKind::Http(_) => DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to build provider HTTP client".to_string(),
            )),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_auth::error::oauth_error;

    #[test]
    fn revoke_failure_becomes_disconnect_failed() {
        let err: Error = oauth_error(OAuthErrorKind::RevokeFailed, "status 400").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Login(LoginErrorKind::DisconnectFailed)
        );
        assert!(err.source.is_some());
    }

    #[test]
    fn record_not_found_becomes_entity_not_found() {
        let err: Error = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
        .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[test]
    fn login_error_codes_are_snake_case() {
        assert_eq!(
            LoginErrorKind::InvalidStateToken.code(),
            "invalid_state_token"
        );
        assert_eq!(LoginErrorKind::NotConnected.code(), "not_connected");
        assert_eq!(AccessErrorKind::Unauthenticated.code(), "unauthenticated");
    }
}

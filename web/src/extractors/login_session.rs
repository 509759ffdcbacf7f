use crate::error::{session_error, Error};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::login::{LoginSession, LOGIN_SESSION_KEY};
use log::*;
use tower_sessions::Session;

/// The caller's `LoginSession`, loaded from the cookie session.
///
/// Handlers mutate `login` through the `domain::login` functions and call
/// `save` afterwards. A browser without a session cookie gets an anonymous
/// `LoginSession`.
pub(crate) struct CurrentSession {
    session: Session,
    pub(crate) login: LoginSession,
}

impl CurrentSession {
    pub(crate) async fn save(&self) -> Result<(), Error> {
        self.session
            .insert(LOGIN_SESSION_KEY, &self.login)
            .await
            .map_err(session_error)
    }

    /// Issue a new session id, keeping the data. Called when a user logs in.
    pub(crate) async fn cycle_id(&self) -> Result<(), Error> {
        self.session.cycle_id().await.map_err(session_error)
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| {
                error!("Session layer missing from request ({status}): {msg}");
                Error::from(DomainError {
                    source: Some(msg.into()),
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                        "Session layer missing".to_string(),
                    )),
                })
            })?;

        let login = session
            .get::<LoginSession>(LOGIN_SESSION_KEY)
            .await
            .map_err(session_error)?
            .unwrap_or_default();
        trace!("Loaded login session in state {:?}", login.state());

        Ok(CurrentSession { session, login })
    }
}

use crate::error::Error;
use crate::extractors::login_session::CurrentSession;
use axum::{extract::FromRequestParts, http::request::Parts};
use domain::error::{AccessErrorKind, Error as DomainError};
use domain::login::CurrentUser;

pub(crate) struct AuthenticatedUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    // Wraps the CurrentSession extractor. Yields the user cached in the login
    // session, or a 401 when nobody is logged in.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = CurrentSession::from_request_parts(parts, state).await?;

        match session.login.current_user() {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => Err(DomainError::access(AccessErrorKind::Unauthenticated).into()),
        }
    }
}

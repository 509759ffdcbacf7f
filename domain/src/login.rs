//! Per-browser login lifecycle: anonymous, state issued, authenticated.
//!
//! `LoginSession` is plain data. The web layer loads it from the cookie
//! session, hands it to one of the functions below and writes it back. Only
//! these functions mutate it, and a failed call leaves it exactly as it was.

use std::fmt;

use log::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::config::Config;

use provider_auth::oauth::{generate_state_token, state_token_matches, Provider};

use crate::error::{Error, LoginErrorKind};
use crate::gateway::google;
use crate::user::{DbUserStore, NewUser, UserStore};
use crate::Id;

/// Key the `LoginSession` is stored under in the cookie session.
pub const LOGIN_SESSION_KEY: &str = "login_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Anonymous,
    StateIssued,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginSession {
    state_token: Option<String>,
    identity: Option<AuthenticatedIdentity>,
}

/// Everything a successful login establishes. Kept as one value so the access
/// token and provider subject can only be present together.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
struct AuthenticatedIdentity {
    access_token: String,
    provider_subject_id: String,
    local_user_id: Id,
    display_name: String,
    first_name: Option<String>,
    email: String,
    picture: Option<String>,
}

impl fmt::Debug for AuthenticatedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedIdentity")
            .field("access_token", &"[REDACTED]")
            .field("provider_subject_id", &self.provider_subject_id)
            .field("local_user_id", &self.local_user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Profile data cached in the session at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: Id,
    pub display_name: String,
    pub first_name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn(CurrentUser),
    /// The session already belonged to this provider subject. Nothing changed.
    AlreadyAuthenticated(CurrentUser),
}

impl AuthenticatedIdentity {
    fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.local_user_id,
            display_name: self.display_name.clone(),
            first_name: self.first_name.clone(),
            email: self.email.clone(),
            picture: self.picture.clone(),
        }
    }
}

impl LoginSession {
    pub fn state(&self) -> LoginState {
        match (&self.identity, &self.state_token) {
            (Some(_), _) => LoginState::Authenticated,
            (None, Some(_)) => LoginState::StateIssued,
            (None, None) => LoginState::Anonymous,
        }
    }

    pub fn state_token(&self) -> Option<&str> {
        self.state_token.as_deref()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.identity.as_ref().map(AuthenticatedIdentity::current_user)
    }

    fn identity(&self) -> Result<&AuthenticatedIdentity, Error> {
        self.identity
            .as_ref()
            .ok_or_else(|| Error::login(LoginErrorKind::NotConnected))
    }

    fn check_state_token(&self, state: &str) -> Result<(), Error> {
        match self.state_token.as_deref() {
            Some(expected) if state_token_matches(expected, state) => Ok(()),
            _ => {
                warn!("Rejecting login attempt with an invalid state token");
                Err(Error::login(LoginErrorKind::InvalidStateToken))
            }
        }
    }
}

/// Mint a fresh state token, store it in the session and return it.
///
/// Replaces any earlier token. An authenticated identity is left in place.
pub fn begin_login(session: &mut LoginSession) -> String {
    let token = generate_state_token();
    session.state_token = Some(token.clone());
    token
}

/// Finish the handshake for the authorization `code` the browser received,
/// `state` being the token it was handed by `begin_login`.
///
/// The checks run in a fixed order and the first failure is returned. The
/// session is only written once every check has passed and the local user is
/// resolved.
pub async fn complete_login<P, U>(
    session: &mut LoginSession,
    provider: &P,
    users: &U,
    state: &str,
    code: &str,
) -> Result<LoginOutcome, Error>
where
    P: Provider + ?Sized,
    U: UserStore + ?Sized,
{
    session.check_state_token(state)?;

    let credentials = provider.exchange_code(code).await?;
    let token_info = provider.verify_token(credentials.access_token()).await?;

    if token_info.user_id.as_deref() != Some(credentials.subject.as_str()) {
        warn!("Token info user id does not match the credential subject");
        return Err(Error::login(LoginErrorKind::TokenSubjectMismatch));
    }

    if token_info.issued_to.as_deref() != Some(provider.client_id()) {
        warn!(
            "Token was issued to {:?}, not to this application",
            token_info.issued_to
        );
        return Err(Error::login(LoginErrorKind::TokenAudienceMismatch));
    }

    if let Some(identity) = &session.identity {
        if identity.provider_subject_id == credentials.subject {
            debug!("User {} is already connected", identity.local_user_id);
            return Ok(LoginOutcome::AlreadyAuthenticated(identity.current_user()));
        }
    }

    let profile = provider.fetch_profile(credentials.access_token()).await?;

    let local_user_id = match users.find_user_by_email(&profile.email).await? {
        Some(id) => id,
        None => {
            users
                .create_user(NewUser {
                    name: profile.name.clone(),
                    email: profile.email.clone(),
                    picture: profile.picture.clone(),
                })
                .await?
        }
    };

    let identity = AuthenticatedIdentity {
        access_token: credentials.access_token().to_string(),
        provider_subject_id: credentials.subject,
        local_user_id,
        display_name: profile.name,
        first_name: profile.given_name,
        email: profile.email,
        picture: profile.picture,
    };
    let user = identity.current_user();
    session.identity = Some(identity);

    info!("User {} logged in", user.id);
    Ok(LoginOutcome::LoggedIn(user))
}

/// Revoke the session's access token and return the session to anonymous.
///
/// If the provider refuses the revocation the session stays authenticated.
pub async fn disconnect<P>(session: &mut LoginSession, provider: &P) -> Result<(), Error>
where
    P: Provider + ?Sized,
{
    let identity = session.identity()?;

    provider.revoke(&identity.access_token).await?;

    info!("User {} disconnected", identity.local_user_id);
    *session = LoginSession::default();
    Ok(())
}

/// `complete_login` against Google and the `users` table.
///
/// The state token is checked before the provider is built.
pub async fn complete_google_login(
    db: &DatabaseConnection,
    config: &Config,
    session: &mut LoginSession,
    state: &str,
    code: &str,
) -> Result<LoginOutcome, Error> {
    session.check_state_token(state)?;
    let provider = google::new_provider(config)?;
    complete_login(session, &provider, &DbUserStore::new(db), state, code).await
}

/// `disconnect` against Google. Fails with `NotConnected` before the provider
/// is built.
pub async fn disconnect_google(config: &Config, session: &mut LoginSession) -> Result<(), Error> {
    session.identity()?;
    let provider = google::new_provider(config)?;
    disconnect(session, &provider).await
}

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind, LoginErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status_code: u16,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

fn error_response(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    let body = ErrorBody {
        status_code: status.into(),
        error: ErrorDetail { code, message },
    };
    (status, Json(body)).into_response()
}

fn login_status(kind: LoginErrorKind) -> StatusCode {
    match kind {
        LoginErrorKind::InvalidStateToken
        | LoginErrorKind::ExchangeFailed
        | LoginErrorKind::InvalidToken
        | LoginErrorKind::TokenSubjectMismatch
        | LoginErrorKind::TokenAudienceMismatch
        | LoginErrorKind::NotConnected => StatusCode::UNAUTHORIZED,
        LoginErrorKind::DisconnectFailed => StatusCode::BAD_REQUEST,
        LoginErrorKind::ProfileFetchFailed => StatusCode::BAD_GATEWAY,
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Login(kind) => {
                warn!("Login request failed: {:?} ({:?})", kind, self.0.source);
                error_response(login_status(kind), kind.code(), kind.message())
            }
            DomainErrorKind::Access(kind) => {
                error_response(StatusCode::UNAUTHORIZED, kind.code(), kind.message())
            }
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        error_response(StatusCode::NOT_FOUND, "not_found", "NOT FOUND")
                    }
                    EntityErrorKind::Invalid => error_response(
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "unprocessable_entity",
                        "UNPROCESSABLE ENTITY",
                    ),
                    EntityErrorKind::DbTransaction => {
                        error!("Entity error: {:?}", self.0.source);
                        internal_server_error()
                    }
                },
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    error!("Internal error: {:?}", self.0.source);
                    internal_server_error()
                }
            },
        }
    }
}

fn internal_server_error() -> Response {
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_server_error",
        "INTERNAL SERVER ERROR",
    )
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Wraps a failure of the cookie session store.
///
/// `tower_sessions::session::Error` has no conversion into the domain error,
/// so it is attached as the source of an internal error here.
pub(crate) fn session_error(err: tower_sessions::session::Error) -> Error {
    error!("Session store error: {err:?}");
    Error(DomainError {
        source: Some(Box::new(err)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
            "Session store error".to_string(),
        )),
    })
}

//! Login handshake endpoints.
//!
//! The browser calls `GET /login` to obtain a state token, runs the provider's
//! sign-in widget, then posts the one-time authorization code it received to
//! `POST /gconnect?state=<token>`. `GET /gdisconnect` revokes the access token
//! and logs out.

use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_user::AuthenticatedUser, login_session::CurrentSession,
};
use crate::params::login::GconnectParams;
use crate::response::login::{
    CurrentUserResponse, DisconnectResponse, LoginResponse, StateTokenResponse,
};
use crate::{AppState, Error};
use axum::extract::{Query, State};
use axum::{http::StatusCode, response::IntoResponse, Json};
use domain::login::{self as LoginApi, LoginOutcome};
use log::*;

/// GET a new state token for the login handshake
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "State token stored in the session and returned", body = StateTokenResponse),
        (status = 500, description = "Session store failure")
    )
)]
pub async fn login(mut session: CurrentSession) -> Result<impl IntoResponse, Error> {
    let state_token = LoginApi::begin_login(&mut session.login);
    session.save().await?;

    debug!("Issued a new login state token");

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        StateTokenResponse { state_token },
    )))
}

/// POST the authorization code to complete the login handshake
///
/// The request body is the raw one-time code returned by the provider's
/// sign-in widget.
#[utoipa::path(
    post,
    path = "/gconnect",
    params(GconnectParams),
    request_body(content = String, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Logged in, or already logged in as this user", body = LoginResponse),
        (status = 401, description = "Invalid state token, rejected code or mismatched token"),
        (status = 502, description = "Profile could not be fetched from the provider")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn gconnect(
    State(app_state): State<AppState>,
    Query(params): Query<GconnectParams>,
    mut session: CurrentSession,
    code: String,
) -> Result<impl IntoResponse, Error> {
    let outcome = LoginApi::complete_google_login(
        app_state.db_conn_ref(),
        &app_state.config,
        &mut session.login,
        &params.state,
        code.trim(),
    )
    .await?;

    if let LoginOutcome::LoggedIn(user) = &outcome {
        session.cycle_id().await?;
        session.save().await?;
        info!("Welcome, {}!", user.display_name);
    }

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        LoginResponse::from(outcome),
    )))
}

/// GET to revoke the access token and log out
#[utoipa::path(
    get,
    path = "/gdisconnect",
    responses(
        (status = 200, description = "Access token revoked and session cleared", body = DisconnectResponse),
        (status = 400, description = "The provider refused to revoke the token"),
        (status = 401, description = "Current user not connected")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn gdisconnect(
    State(app_state): State<AppState>,
    mut session: CurrentSession,
) -> Result<impl IntoResponse, Error> {
    LoginApi::disconnect_google(&app_state.config, &mut session.login).await?;
    session.save().await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DisconnectResponse {
            status: "disconnected".to_string(),
        },
    )))
}

/// GET the currently logged in user
#[utoipa::path(
    get,
    path = "/current_user",
    responses(
        (status = 200, description = "The logged in user", body = CurrentUserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn current_user(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        CurrentUserResponse::from(user),
    )))
}

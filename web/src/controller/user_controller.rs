use crate::controller::ApiResponse;
use crate::response::user::PublicUserResponse;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::{http::StatusCode, response::IntoResponse, Json};
use domain::user::{DbUserStore, UserStore};
use domain::Id;

use log::*;

/// GET the public profile of a User specified by its id.
///
/// The email address is not included.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = i32, Path, description = "User id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved a User", body = PublicUserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET User by id: {id}");

    let user = DbUserStore::new(app_state.db_conn_ref()).get_user(id).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        PublicUserResponse::from(user),
    )))
}

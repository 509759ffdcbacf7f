use crate::controller::{health_check_controller, login_controller, user_controller};
use crate::response::login::{
    CurrentUserResponse, DisconnectResponse, LoginResponse, LoginStatus, StateTokenResponse,
};
use crate::response::user::PublicUserResponse;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Exercise Catalog API"
        ),
        paths(
            health_check_controller::health_check,
            login_controller::login,
            login_controller::gconnect,
            login_controller::gdisconnect,
            login_controller::current_user,
            user_controller::read,
        ),
        components(
            schemas(
                PublicUserResponse,
                StateTokenResponse,
                LoginStatus,
                LoginResponse,
                DisconnectResponse,
                CurrentUserResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "exercise_catalog", description = "Exercise Catalog login API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned in the Set-Cookie header of GET /login",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(login_routes(app_state.clone()))
        .merge(user_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn login_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login", get(login_controller::login))
        .route("/gconnect", post(login_controller::gconnect))
        .route("/gdisconnect", get(login_controller::gdisconnect))
        .route("/current_user", get(login_controller::current_user))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/users/{id}", get(user_controller::read))
        .with_state(app_state)
}

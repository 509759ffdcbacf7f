use domain::login::{CurrentUser, LoginOutcome};
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct StateTokenResponse {
    pub(crate) state_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LoginStatus {
    LoggedIn,
    AlreadyAuthenticated,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LoginResponse {
    pub(crate) status: LoginStatus,
    pub(crate) display_name: String,
    pub(crate) first_name: Option<String>,
    pub(crate) picture: Option<String>,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        let (status, user) = match outcome {
            LoginOutcome::LoggedIn(user) => (LoginStatus::LoggedIn, user),
            LoginOutcome::AlreadyAuthenticated(user) => (LoginStatus::AlreadyAuthenticated, user),
        };
        Self {
            status,
            display_name: user.display_name,
            first_name: user.first_name,
            picture: user.picture,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DisconnectResponse {
    pub(crate) status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CurrentUserResponse {
    pub(crate) id: Id,
    pub(crate) display_name: String,
    pub(crate) first_name: Option<String>,
    pub(crate) email: String,
    pub(crate) picture: Option<String>,
}

impl From<CurrentUser> for CurrentUserResponse {
    fn from(user: CurrentUser) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            first_name: user.first_name,
            email: user.email,
            picture: user.picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_status_serializes_as_snake_case() {
        let outcome = LoginOutcome::AlreadyAuthenticated(CurrentUser {
            id: 1,
            display_name: "Ada Lovelace".to_string(),
            first_name: Some("Ada".to_string()),
            email: "a@x.com".to_string(),
            picture: None,
        });

        let value = serde_json::to_value(LoginResponse::from(outcome)).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "already_authenticated",
                "display_name": "Ada Lovelace",
                "first_name": "Ada",
                "picture": null,
            })
        );
    }
}

use domain::{users, Id};
use serde::Serialize;
use utoipa::ToSchema;

/// What anyone may see of a user, e.g. as the creator of an exercise.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PublicUserResponse {
    pub(crate) id: Id,
    pub(crate) name: String,
    pub(crate) picture: Option<String>,
}

impl From<users::Model> for PublicUserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            picture: user.picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_user_leaves_out_the_email() {
        let user = users::Model {
            id: 4,
            name: "Ada Lovelace".to_string(),
            email: "a@x.com".to_string(),
            picture: None,
            created_at: Default::default(),
        };

        let value = serde_json::to_value(PublicUserResponse::from(user)).unwrap();
        assert_eq!(
            value,
            json!({ "id": 4, "name": "Ada Lovelace", "picture": null })
        );
    }
}

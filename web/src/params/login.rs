use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub(crate) struct GconnectParams {
    /// State token handed out by `GET /login`
    #[serde(default)]
    pub(crate) state: String,
}

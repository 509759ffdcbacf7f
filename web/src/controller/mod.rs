use serde::Serialize;
pub(crate) mod health_check_controller;
pub(crate) mod login_controller;
pub(crate) mod user_controller;

/// Envelope for every successful JSON response.
#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }
}

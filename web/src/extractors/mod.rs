pub(crate) mod authenticated_user;
pub(crate) mod login_session;

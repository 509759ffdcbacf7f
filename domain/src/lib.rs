//! Domain logic of the exercise catalog login service.
//!
//! Consumers of this crate do not need to depend on `entity_api` or
//! `provider-auth` directly: the types they need are re-exported here and
//! every lower-layer error is translated into `domain::error::Error`.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{users, Id};

pub use provider_auth::oauth::Provider;

pub mod error;
pub mod login;
pub mod user;

pub mod gateway;

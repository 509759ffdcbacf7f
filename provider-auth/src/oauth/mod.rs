//! OAuth 2.0 login handshake against an external identity provider.

mod provider;
mod state;

pub mod providers;

pub use provider::{Credentials, Profile, Provider, TokenInfo};
pub use state::{generate_state_token, state_token_matches, STATE_TOKEN_LEN};

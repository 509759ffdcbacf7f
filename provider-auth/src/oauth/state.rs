//! CSRF state tokens for the login handshake.

use rand::Rng;

/// Number of characters in a state token.
pub const STATE_TOKEN_LEN: usize = 32;

const STATE_TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a cryptographically random state token of uppercase letters and
/// digits.
pub fn generate_state_token() -> String {
    let mut rng = rand::thread_rng();
    (0..STATE_TOKEN_LEN)
        .map(|_| STATE_TOKEN_ALPHABET[rng.gen_range(0..STATE_TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Compare a stored state token with the one echoed back by the client
/// without short-circuiting on the first differing byte.
pub fn state_token_matches(expected: &str, received: &str) -> bool {
    expected.len() == received.len()
        && expected
            .bytes()
            .zip(received.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state_token_length_and_alphabet() {
        let token = generate_state_token();
        assert_eq!(token.len(), STATE_TOKEN_LEN);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_state_token_uniqueness() {
        assert_ne!(generate_state_token(), generate_state_token());
    }

    #[test]
    fn test_state_token_matches() {
        let token = generate_state_token();
        assert!(state_token_matches(&token, &token.clone()));
        assert!(!state_token_matches(&token, &token[..STATE_TOKEN_LEN - 1]));
        assert!(!state_token_matches(&token, &token.to_lowercase()));
        assert!(!state_token_matches(&token, ""));
    }
}

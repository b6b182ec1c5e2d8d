//! Random guest tokens.

use rally_application::TokenGenerator;
use rally_domain::GuestToken;
use rand::Rng;
use rand::distributions::Alphanumeric;

const TOKEN_LEN: usize = 32;

/// Mints 32-character alphanumeric tokens from the thread-local RNG.
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn guest_token(&self) -> GuestToken {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        GuestToken::new(token)
    }
}

use crate::{types::Token, utils};

/// Seconds before the nominal expiry at which a token is no longer handed out.
pub const EXPIRY_BUFFER_SECS: u64 = 240;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    /// Returns the token while it is still usable. Tokens are never refreshed;
    /// once this returns `None` the user has to log in again.
    pub fn valid_token(&self) -> Option<&Token> {
        if self.is_expired() {
            None
        } else {
            Some(&self.token)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(utils::now_timestamp())
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now + EXPIRY_BUFFER_SECS >= self.token.obtained_at + self.token.expires_in
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

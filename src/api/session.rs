//! The operator session handed to every API call.
//!
//! Tokens are only ever replaced by the client's refresh interceptor. Callers
//! check [`Session::is_dirty`] afterwards and persist the new tokens.

use crate::{core::access::AccessProfile, models::TokenPair};

/// Who is calling and with which credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Discord user the session belongs to
    pub discord_user_id: String,
    /// Backend username
    pub username: String,
    /// Role and granted components
    pub profile: AccessProfile,
    tokens: TokenPair,
    dirty: bool,
}

impl Session {
    /// Creates a clean session.
    #[must_use]
    pub const fn new(
        discord_user_id: String,
        username: String,
        profile: AccessProfile,
        tokens: TokenPair,
    ) -> Self {
        Self {
            discord_user_id,
            username,
            profile,
            tokens,
            dirty: false,
        }
    }

    /// Current tokens.
    #[must_use]
    pub const fn tokens(&self) -> &TokenPair {
        &self.tokens
    }

    /// Installs refreshed tokens. A response without a new refresh token keeps the old one.
    pub fn replace_tokens(&mut self, refreshed: TokenPair) {
        let refresh_token = refreshed
            .refresh_token
            .or_else(|| self.tokens.refresh_token.take());
        self.tokens = TokenPair {
            access_token: refreshed.access_token,
            refresh_token,
        };
        self.dirty = true;
    }

    /// Whether tokens changed since the session was loaded or last persisted.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the tokens as persisted.
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "42".to_string(),
            "ada".to_string(),
            AccessProfile::default(),
            TokenPair {
                access_token: "a1".to_string(),
                refresh_token: Some("r1".to_string()),
            },
        )
    }

    #[test]
    fn test_replace_tokens_marks_dirty() {
        let mut session = session();
        assert!(!session.is_dirty());

        session.replace_tokens(TokenPair {
            access_token: "a2".to_string(),
            refresh_token: Some("r2".to_string()),
        });
        assert!(session.is_dirty());
        assert_eq!(session.tokens().access_token, "a2");
        assert_eq!(session.tokens().refresh_token.as_deref(), Some("r2"));

        session.mark_clean();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_missing_refresh_token_keeps_previous() {
        let mut session = session();
        session.replace_tokens(TokenPair {
            access_token: "a2".to_string(),
            refresh_token: None,
        });
        assert_eq!(session.tokens().refresh_token.as_deref(), Some("r1"));
    }
}

//! Bearer token sources for authenticated requests.

use std::fmt;

/// Supplies the bearer token attached to authenticated requests.
///
/// The client asks for a fresh token on every request, so a rotating
/// session source is picked up without rebuilding the client.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token, typically loaded from config or environment.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

// The token itself must never reach log output.
impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

/// No authentication; anonymous endpoints and local development.
#[derive(Debug, Default)]
pub struct NoAuth;

impl TokenProvider for NoAuth {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

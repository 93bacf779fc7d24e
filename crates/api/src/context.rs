use bizdash_auth::SessionToken;

/// Session context for a request that passed the route guard.
///
/// Anonymous visitors reach public pages (and the login page) with no token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    pub fn new(token: Option<SessionToken>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

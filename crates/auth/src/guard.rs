use serde::Serialize;

use crate::token::SessionToken;

/// Outcome of the route guard for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Continue with normal request handling.
    PassThrough,
    /// Send the client elsewhere.
    Redirect(String),
}

impl RouteDecision {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Session-gated routing policy.
///
/// - No IO
/// - No panics
/// - The decision depends only on the path and whether a token is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    /// Every path starting with this prefix requires a session.
    pub protected_prefix: String,
    /// Where unauthenticated visitors are sent; authenticated ones are bounced off it.
    pub login_path: String,
    /// Where authenticated visitors of the login page are sent.
    pub home_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self {
            protected_prefix: "/dashboard".to_string(),
            login_path: "/auth/login".to_string(),
            home_path: "/dashboard".to_string(),
        }
    }
}

impl RouteGuard {
    pub fn new(
        protected_prefix: impl Into<String>,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            protected_prefix: protected_prefix.into(),
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    /// Whether the guard has an opinion about `path` at all.
    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(&self.protected_prefix) || path == self.login_path
    }

    pub fn decide(&self, path: &str, token_present: bool) -> RouteDecision {
        if !token_present && path.starts_with(&self.protected_prefix) {
            return RouteDecision::redirect(self.login_path.clone());
        }
        if token_present && path == self.login_path {
            return RouteDecision::redirect(self.home_path.clone());
        }
        RouteDecision::PassThrough
    }

    /// Decide from a raw `Cookie` header; malformed headers count as "no token".
    pub fn decide_request(&self, path: &str, cookie_header: Option<&str>) -> RouteDecision {
        let token_present = SessionToken::from_cookie_header(cookie_header).is_some();
        let decision = self.decide(path, token_present);
        tracing::debug!(path, token_present, ?decision, "route guard decision");
        decision
    }
}

/// Decide with the default guard (`/dashboard` protected, `/auth/login` as login page).
pub fn decide(path: &str, token_present: bool) -> RouteDecision {
    RouteGuard::default().decide(path, token_present)
}

use serde::Serialize;
use thiserror::Error;

use crate::cookies::parse_cookies;

/// Cookie name carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Opaque session credential.
///
/// Only its presence is inspected at this layer; signature and expiry checks
/// belong to the backend that issued it.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no session token cookie")]
    Missing,

    #[error("malformed session cookie")]
    MalformedCookie,
}

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the token from a raw `Cookie` header value.
    pub fn parse(header: &str) -> Result<Self, TokenError> {
        let cookies = parse_cookies(header);
        if cookies.is_empty() && !header.trim().is_empty() {
            return Err(TokenError::MalformedCookie);
        }

        match cookies.get(TOKEN_COOKIE) {
            Some(value) if value.is_empty() => Err(TokenError::MalformedCookie),
            Some(value) => Ok(Self(value.clone())),
            None => Err(TokenError::Missing),
        }
    }

    /// Lenient extraction: every failure degrades to "no token".
    pub fn from_cookie_header(header: Option<&str>) -> Option<Self> {
        let header = header?;
        match Self::parse(header) {
            Ok(token) => Some(token),
            Err(TokenError::MalformedCookie) => {
                tracing::debug!("malformed session cookie treated as absent");
                None
            }
            Err(TokenError::Missing) => None,
        }
    }
}

// Never print the credential itself.
impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

//! `bizdash-auth` — session boundary for the dashboard.
//!
//! This crate is intentionally decoupled from HTTP: it parses cookie headers,
//! extracts the session token and decides where a request should go.

pub mod cookies;
pub mod guard;
pub mod token;

pub use cookies::parse_cookies;
pub use guard::{decide, RouteDecision, RouteGuard};
pub use token::{SessionToken, TokenError, TOKEN_COOKIE};

//! Environment-driven server configuration.

use std::net::SocketAddr;

use anyhow::{ensure, Context};
use bizdash_auth::RouteGuard;

use crate::app::routes::FIXED_PATHS;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub guard: RouteGuard,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            guard: RouteGuard::default(),
        }
    }
}

impl ApiConfig {
    /// Read `BIND_ADDR`, `PROTECTED_PREFIX`, `LOGIN_PATH` and `HOME_PATH`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("BIND_ADDR") {
            config.bind_addr = raw
                .parse()
                .with_context(|| format!("invalid BIND_ADDR: {raw}"))?;
        }

        for (key, slot) in [
            ("PROTECTED_PREFIX", &mut config.guard.protected_prefix),
            ("LOGIN_PATH", &mut config.guard.login_path),
            ("HOME_PATH", &mut config.guard.home_path),
        ] {
            if let Some(path) = lookup(key) {
                ensure!(path.starts_with('/'), "{key} must start with '/': {path}");
                ensure!(
                    !path.contains([':', '*', '{', '}']),
                    "{key} must be a literal path: {path}"
                );
                *slot = path;
            }
        }

        // A login page behind the gate would redirect to itself forever.
        ensure!(
            !config.guard.login_path.starts_with(&config.guard.protected_prefix),
            "LOGIN_PATH must not live under PROTECTED_PREFIX"
        );

        let guard = &config.guard;
        for (key, path) in [
            ("PROTECTED_PREFIX", &guard.protected_prefix),
            ("LOGIN_PATH", &guard.login_path),
        ] {
            ensure!(
                !FIXED_PATHS.contains(&path.as_str()),
                "{key} collides with the built-in route {path}"
            );
        }

        // Logged-in visitors of the login page are sent home.
        ensure!(
            guard.home_path != guard.login_path,
            "HOME_PATH must differ from LOGIN_PATH"
        );

        Ok(config)
    }
}

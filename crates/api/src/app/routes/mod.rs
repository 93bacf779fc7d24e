use axum::{
    routing::{get, post},
    Router,
};

use bizdash_auth::RouteGuard;

pub mod dashboard;
pub mod session;
pub mod system;

pub const HEALTH_PATH: &str = "/health";
pub const SESSION_PATH: &str = "/session";

/// Routes mounted independently of the configurable gate paths.
pub const FIXED_PATHS: [&str; 3] = [HEALTH_PATH, SESSION_PATH, session::LOGOUT_PATH];

/// Router for pages the session gate knows about, mounted at the configured paths.
pub fn router(guard: &RouteGuard) -> Router {
    let entity_path = format!("{}/:entity", guard.protected_prefix.trim_end_matches('/'));

    Router::new()
        .route(SESSION_PATH, get(system::session))
        .route(&guard.login_path, get(session::login_page))
        .route(session::LOGOUT_PATH, post(session::logout))
        .route(&guard.protected_prefix, get(dashboard::index))
        .route(&entity_path, get(dashboard::entity))
}

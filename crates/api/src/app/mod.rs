//! HTTP application wiring (Axum router + session gate).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Router {
    let guard = Arc::new(config.guard.clone());
    let guard_state = middleware::GuardState {
        guard: guard.clone(),
    };

    // The gate wraps everything, fallback included: it decides which paths it cares about.
    Router::new()
        .route(routes::HEALTH_PATH, get(routes::system::health))
        .merge(routes::router(&config.guard))
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    guard_state,
                    middleware::session_guard,
                ))
                .layer(Extension(guard)),
        )
}

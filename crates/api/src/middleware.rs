use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use bizdash_auth::{RouteDecision, RouteGuard, SessionToken};

use crate::context::SessionContext;

#[derive(Clone)]
pub struct GuardState {
    pub guard: Arc<RouteGuard>,
}

/// Session gate run on every request.
///
/// Redirect decisions become `307 Temporary Redirect`; pass-through requests
/// continue with a [`SessionContext`] extension.
pub async fn session_guard(
    State(state): State<GuardState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookies = cookie_header(req.headers());

    match state.guard.decide_request(req.uri().path(), cookies.as_deref()) {
        RouteDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
        RouteDecision::PassThrough => {
            let token = SessionToken::from_cookie_header(cookies.as_deref());
            req.extensions_mut().insert(SessionContext::new(token));
            next.run(req).await
        }
    }
}

/// All `Cookie` headers joined with `"; "`.
///
/// A header that is not valid UTF-8 makes the whole cookie jar count as absent.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let mut parts = Vec::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else {
            tracing::debug!("non UTF-8 cookie header treated as absent");
            return None;
        };
        parts.push(value);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

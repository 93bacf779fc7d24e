use std::sync::Arc;

use axum::{
    extract::Extension,
    http::header,
    response::{AppendHeaders, IntoResponse, Redirect},
    Json,
};

use bizdash_auth::{RouteGuard, TOKEN_COOKIE};

pub const LOGOUT_PATH: &str = "/auth/logout";

/// Login page model; the credential exchange itself belongs to the backend.
pub async fn login_page(Extension(guard): Extension<Arc<RouteGuard>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "page": "login",
        "cookie": TOKEN_COOKIE,
        "redirect_after_login": guard.home_path,
    }))
}

/// Drop the session cookie and send the visitor to the login page.
pub async fn logout(Extension(guard): Extension<Arc<RouteGuard>>) -> impl IntoResponse {
    let expired = format!("{TOKEN_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    (
        AppendHeaders([(header::SET_COOKIE, expired)]),
        Redirect::to(&guard.login_path),
    )
}

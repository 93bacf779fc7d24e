use bizdash_api::config::ApiConfig;
use bizdash_auth::RouteGuard;
use reqwest::{header, redirect, StatusCode};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = bizdash_api::app::build_app(&config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    async fn spawn_default() -> Self {
        Self::spawn(ApiConfig::default()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Redirects must be observed, not followed.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

async fn get_with_cookie(srv: &TestServer, path: &str, cookie: Option<&str>) -> reqwest::Response {
    let mut req = client().get(format!("{}{}", srv.base_url, path));
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.send().await.unwrap()
}

fn location(res: &reqwest::Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn dashboard_with_session_cookie_passes_through() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard/sales", Some("token=abc123; theme=dark")).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["descriptor"]["base_path"], "/sales");
}

#[tokio::test]
async fn dashboard_without_cookie_redirects_to_login() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard/sales", Some("")).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");

    let res = get_with_cookie(&srv, "/dashboard", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");
}

#[tokio::test]
async fn unmatched_protected_paths_are_still_gated() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard/sales/42/edit", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/login");

    let res = get_with_cookie(&srv, "/dashboard/sales/42/edit", Some("token=abc123")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_cookie_counts_as_logged_out() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard", Some(";;;===;")).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);

    let res = get_with_cookie(&srv, "/dashboard", Some("token=")).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn logged_in_visitor_is_sent_from_login_to_dashboard() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/auth/login", Some("token=abc123")).await;

    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/dashboard");
}

#[tokio::test]
async fn anonymous_visitor_sees_login_page() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/auth/login", None).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["page"], "login");
}

#[tokio::test]
async fn public_paths_pass_with_or_without_token() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get_with_cookie(&srv, "/health", Some("token=abc123")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get_with_cookie(&srv, "/session", Some("token=abc123")).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], true);

    let res = get_with_cookie(&srv, "/session", None).await;
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn dashboard_index_lists_catalog() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard", Some("token=abc123")).await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let entities = body["entities"].as_array().unwrap();
    assert!(entities
        .iter()
        .any(|e| e["href"] == "/dashboard/branches" && e["api"] == "/branches"));
    assert!(entities
        .iter()
        .any(|e| e["entity"] == "company-profile" && e["report"] == false));
}

#[tokio::test]
async fn entity_page_maps_table_state_to_collection_request() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(
        &srv,
        "/dashboard/branches?search=north&sort=name&order=desc",
        Some("token=abc123"),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let request = body["request"].as_str().unwrap();
    assert!(request.starts_with("/branches?page=1&limit=10"), "{request}");
    assert!(request.contains("search=north&sort=name&order=desc"), "{request}");
    assert_eq!(body["query"]["sort"]["dir"], "desc");
}

#[tokio::test]
async fn unknown_entity_is_a_json_404() {
    let srv = TestServer::spawn_default().await;

    let res = get_with_cookie(&srv, "/dashboard/spaceships", Some("token=abc123")).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unknown_entity");
}

#[tokio::test]
async fn logout_expires_cookie_and_redirects_to_login() {
    let srv = TestServer::spawn_default().await;

    let res = client()
        .post(format!("{}/auth/logout", srv.base_url))
        .header(header::COOKIE, "token=abc123")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/auth/login");
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn configured_paths_drive_the_gate() {
    let srv = TestServer::spawn(ApiConfig {
        guard: RouteGuard::new("/admin", "/signin", "/admin"),
        ..ApiConfig::default()
    })
    .await;

    let res = get_with_cookie(&srv, "/admin/roles", None).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/signin");

    let res = get_with_cookie(&srv, "/admin/roles", Some("token=abc123")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = get_with_cookie(&srv, "/signin", Some("token=abc123")).await;
    assert_eq!(location(&res), "/admin");

    // The default prefix is no longer special.
    let res = get_with_cookie(&srv, "/dashboard", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gate_and_session_context_read_the_same_cookie_jar() {
    let srv = TestServer::spawn_default().await;
    let split_jar = |path: &str| {
        client()
            .get(format!("{}{}", srv.base_url, path))
            .header(header::COOKIE, "theme=dark")
            .header(header::COOKIE, "token=abc123")
    };

    let res = split_jar("/dashboard").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = split_jar("/session").send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], true);

    let res = split_jar("/auth/login").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/dashboard");
}

//! Test helpers and utilities for FluentRouter tests
//!
//! These tests use `oneshot()` for fast, in-process testing without network I/O.
//! Tests that need a real socket live in the crate's `tests/` directory.
//!
//! ## Available Helpers
//!
//! - Configuration builders: `create_base_config()`, `create_config_with_toml()`
//! - Router builders: `create_test_router()`
//! - Request helpers: `get_request()`, `post_request()`, `forwarded_request()`, `cookie_request()`
//! - Response helpers: `get_body_string()`

use crate::{Config, FluentRouter};
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
    routing::get,
};

#[cfg(test)]
pub(crate) mod middleware;

// ============================================================================
// Configuration Helpers
// ============================================================================

/// Base TOML configuration template for tests.
const BASE_CONFIG_TOML: &str = r#"
[http]
bind_addr = "127.0.0.1"
bind_port = 3000
trailing_slash = "redirect"

[http.forwarded_for]
header = "x-forwarded-for"

[session]
cookie_name = "sessionid"

[logging]
format = "json"
"#;

/// Creates a base test configuration by parsing TOML.
/// Does not depend on `RUST_ENV`, unlike `Config::default()`.
pub(crate) fn create_base_config() -> Config {
    BASE_CONFIG_TOML
        .parse()
        .expect("Failed to parse test config TOML")
}

/// Creates a test configuration with additional top-level TOML injected
/// before the first table.
pub(crate) fn create_config_with_toml(additional_toml: &str) -> Config {
    let toml_str = format!("{additional_toml}\n{BASE_CONFIG_TOML}");
    toml_str.parse().expect("Failed to parse test config TOML")
}

// ============================================================================
// Router Helpers
// ============================================================================

/// Creates a router with the pages used across the middleware tests and the
/// full middleware stack.
pub(crate) fn create_test_router(config: Option<Config>) -> Router {
    FluentRouter::without_state(config.unwrap_or_else(create_base_config))
        .expect("Failed to create FluentRouter")
        .route("/en-US/docs/files", get(|| async { "files" }))
        .route("/en-US/about/", get(|| async { "about" }))
        .route("/noop", get(|| async { "OK\n" }).post(|| async { "OK\n" }))
        .setup_middleware()
        .expect("Failed to setup middleware")
        .into_inner()
}

// ============================================================================
// Request Helpers
// ============================================================================

/// Creates a GET request to the specified URI.
pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Creates a POST request to the specified URI with an empty body.
pub(crate) fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Creates a GET request carrying an `X-Forwarded-For` header.
pub(crate) fn forwarded_request(uri: &str, forwarded_for: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", forwarded_for)
        .body(Body::empty())
        .unwrap()
}

/// Creates a GET request carrying a `Cookie` header.
pub(crate) fn cookie_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

// ============================================================================
// Response Helpers
// ============================================================================

/// Extracts the body from a response as a String.
pub(crate) async fn get_body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&body).to_string()
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Handler for nested route tests.
pub(crate) async fn nested_handler() -> &'static str {
    "nested response"
}

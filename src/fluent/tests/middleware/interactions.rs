//! Tests for the hooks working together

use super::super::{create_base_config, create_test_router, forwarded_request, get_body_string};
use crate::{ClientAddr, FluentRouter};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use tower::ServiceExt;
use tower_sessions::Session;
use tracing_test::traced_test;

#[tokio::test]
async fn test_redirect_carries_no_session_cookie() {
    let app = create_test_router(None);

    let response = app
        .oneshot(forwarded_request("/en-US/docs/files/?q=1", "1.1.1.1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_handler_sees_address_and_session() {
    async fn whoami(ClientAddr(ip): ClientAddr, session: Session) -> String {
        session.insert("ip", ip.to_string()).await.ok();
        format!("{ip}")
    }

    let app = FluentRouter::without_state(create_base_config())
        .unwrap()
        .route("/whoami", get(whoami))
        .setup_middleware()
        .unwrap()
        .into_inner();

    let response = app
        .oneshot(forwarded_request("/whoami", "3.3.3.3, 4.4.4.4"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    assert_eq!(get_body_string(response).await, "3.3.3.3");
}

#[tokio::test]
#[traced_test]
async fn test_request_span_records_client_addr() {
    let app = create_test_router(None);

    let request = Request::builder()
        .uri("/noop/")
        .header("x-forwarded-for", "9.9.9.9")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);

    // The redirect is logged inside the request span
    assert!(logs_contain("Redirecting to path without trailing slash"));
    assert!(logs_contain("client_addr=9.9.9.9"));
}

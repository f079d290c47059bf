//! Tests for trailing slash redirects

use super::super::{create_base_config, create_test_router, get_body_string, get_request, post_request};
use crate::{FluentRouter, HttpMiddleware, TrailingSlash};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use tower::ServiceExt;

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = create_test_router(None);

    let response = app.clone().oneshot(get_request("/en-US/ohnoez")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("/en-US/ohnoez/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());
}

#[tokio::test]
async fn test_known_path_with_slash_redirects() {
    let app = create_test_router(None);

    let response = app.oneshot(get_request("/en-US/docs/files/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/en-US/docs/files");
}

#[tokio::test]
async fn test_redirect_keeps_encoded_query() {
    let app = create_test_router(None);

    // `Ã` as sent by a browser
    let response = app
        .oneshot(get_request("/en-US/docs/files/?xxx=%C3%83"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert!(location(&response).ends_with("/en-US/docs/files?xxx=%C3%83"));
}

#[tokio::test]
async fn test_redirect_keeps_multiple_query_params() {
    let app = create_test_router(None);

    let response = app
        .oneshot(get_request("/en-US/docs/files/?page=2&sort=name"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/en-US/docs/files?page=2&sort=name");
}

#[tokio::test]
async fn test_existing_paths_are_untouched() {
    let app = create_test_router(None);

    let response = app.clone().oneshot(get_request("/en-US/docs/files")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_string(response).await, "files");

    // Registered with the slash, so served as is
    let response = app.oneshot(get_request("/en-US/about/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_string(response).await, "about");
}

#[tokio::test]
async fn test_head_redirects_post_does_not() {
    let app = create_test_router(None);

    let head = Request::builder()
        .method(Method::HEAD)
        .uri("/noop/")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(head).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/noop");

    let response = app.oneshot(post_request("/noop/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_and_protocol_relative_paths_never_redirect() {
    let app = create_test_router(None);

    let response = app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get_request("//noop/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_path_parameters_redirect() {
    let app = FluentRouter::without_state(create_base_config())
        .unwrap()
        .route("/users/{id}", get(|| async { "user" }))
        .setup_trailing_slash()
        .into_inner();

    let response = app.clone().oneshot(get_request("/users/42/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/users/42");

    let response = app.oneshot(get_request("/users/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_and_merged_routes_redirect() {
    let app = FluentRouter::without_state(create_base_config())
        .unwrap()
        .nest("/api", Router::new().route("/users", get(|| async { "users" })))
        .merge(Router::new().route("/merged", get(|| async { "merged" })))
        .known_route("/merged")
        .setup_trailing_slash()
        .into_inner();

    let response = app.clone().oneshot(get_request("/api/users/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/api/users");

    let response = app.oneshot(get_request("/merged/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(location(&response), "/merged");
}

#[tokio::test]
async fn test_custom_fallback_404_is_redirected() {
    let pages = Router::new()
        .route("/page", get(|| async { "page" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "custom not found") });
    let app = FluentRouter::without_state(create_base_config())
        .unwrap()
        .merge(pages)
        .known_route("/page")
        .setup_trailing_slash()
        .into_inner();

    let response = app.clone().oneshot(get_request("/page/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);

    let response = app.oneshot(get_request("/nothing/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_string(response).await, "custom not found");
}

#[tokio::test]
async fn test_redirect_can_be_turned_off() {
    let config = create_base_config().with_trailing_slash(TrailingSlash::Off);
    let app = create_test_router(Some(config));
    let response = app.oneshot(get_request("/en-US/docs/files/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let config = create_base_config().with_excluded_middlewares(vec![HttpMiddleware::TrailingSlash]);
    let app = create_test_router(Some(config));
    let response = app.oneshot(get_request("/en-US/docs/files/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

//! Tests for client address extraction

use super::super::{create_base_config, forwarded_request, get_body_string, get_request};
use crate::{ClientAddr, Config, FluentRouter, HttpMiddleware};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    routing::get,
};
use std::net::SocketAddr;
use tower::ServiceExt;

async fn client_ip(ClientAddr(ip): ClientAddr) -> String {
    ip.to_string()
}

async fn maybe_client_ip(addr: Option<ClientAddr>) -> String {
    addr.map(|a| a.to_string()).unwrap_or_else(|| "none".into())
}

fn create_ip_router(config: Config) -> axum::Router {
    FluentRouter::without_state(config)
        .unwrap()
        .route("/ip", get(client_ip))
        .route("/maybe-ip", get(maybe_client_ip))
        .setup_middleware()
        .unwrap()
        .into_inner()
}

fn request_from_peer(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    let mut builder = Request::builder().uri(uri).extension(ConnectInfo(peer));
    if let Some(value) = forwarded_for {
        builder = builder.header("x-forwarded-for", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_single_forwarded_address() {
    let app = create_ip_router(create_base_config());

    for ip in ["1.1.1.1", "2.2.2.2"] {
        let response = app.clone().oneshot(forwarded_request("/ip", ip)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get_body_string(response).await, ip);
    }
}

#[tokio::test]
async fn test_first_forwarded_address_wins() {
    let app = create_ip_router(create_base_config());

    let response = app
        .oneshot(forwarded_request("/ip", "3.3.3.3, 4.4.4.4"))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "3.3.3.3");
}

#[tokio::test]
async fn test_header_takes_precedence_over_peer() {
    let app = create_ip_router(create_base_config());

    let response = app
        .oneshot(request_from_peer("/ip", "10.0.0.2:41000", Some("1.1.1.1")))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "1.1.1.1");
}

#[tokio::test]
async fn test_falls_back_to_peer_address() {
    let app = create_ip_router(create_base_config());

    let response = app
        .clone()
        .oneshot(request_from_peer("/ip", "10.0.0.2:41000", None))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "10.0.0.2");

    let response = app
        .oneshot(request_from_peer("/ip", "10.0.0.2:41000", Some("garbage")))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "10.0.0.2");
}

#[tokio::test]
async fn test_unknown_address_is_a_json_error() {
    let app = create_ip_router(create_base_config());

    let response = app.clone().oneshot(get_request("/ip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&get_body_string(response).await).unwrap();
    assert_eq!(json["error_code"], "INTERNAL_ERROR");

    let response = app.oneshot(get_request("/maybe-ip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_string(response).await, "none");
}

#[tokio::test]
async fn test_custom_header_name() {
    let app = create_ip_router(create_base_config().with_forwarded_for_header("X-Real-IP"));

    let request = Request::builder()
        .uri("/ip")
        .header("x-real-ip", "5.5.5.5")
        .header("x-forwarded-for", "6.6.6.6")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(get_body_string(response).await, "5.5.5.5");
}

#[tokio::test]
async fn test_disabled_header_uses_peer_only() {
    let app = create_ip_router(create_base_config().with_forwarded_for(false));

    let response = app
        .oneshot(request_from_peer("/ip", "192.168.0.9:5000", Some("1.1.1.1")))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "192.168.0.9");
}

#[tokio::test]
async fn test_excluded_middleware_records_nothing() {
    let config =
        create_base_config().with_excluded_middlewares(vec![HttpMiddleware::ForwardedFor]);
    let app = create_ip_router(config);

    let response = app
        .oneshot(forwarded_request("/maybe-ip", "1.1.1.1"))
        .await
        .unwrap();
    assert_eq!(get_body_string(response).await, "none");
}

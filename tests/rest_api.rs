//! REST API tests driven through the router with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use common::{Harness, fast_policy, frenet_reply, mount_quote};
use serde_json::{Value, json};
use shipquote::api::rest::{
    AppState, CLIENT_ID_HEADER, CORRELATION_ID_HEADER, ErrorResponse, create_router,
};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

fn app(server: &MockServer, enable_carrier_probe: bool) -> Router {
    let harness = Harness::in_memory(server, fast_policy(0));
    create_router(Arc::new(AppState {
        lifecycle: harness.lifecycle,
        labels: harness.labels,
        enable_carrier_probe,
    }))
}

fn quote_body() -> Value {
    json!({
        "origin_postal": "01310100",
        "destination_postal": "04547000",
        "weight": 2.5,
        "length": 30,
        "width": 20,
        "height": 10
    })
}

fn post_json(uri: &str, client: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header(CORRELATION_ID_HEADER, "corr-http");
    if let Some(client) = client {
        builder = builder.header(CLIENT_ID_HEADER, client);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, client: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(CLIENT_ID_HEADER, client)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_then_fetch_quote() {
    let server = MockServer::start().await;
    mount_quote(&server, 200, frenet_reply(&[("03298", "PAC", "10.00")])).await;
    let app = app(&server, false);

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/quotes", Some("acme"), &quote_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(CORRELATION_ID_HEADER).unwrap(),
        "corr-http"
    );
    let created = json_body(response).await;
    assert_eq!(created["status"], "success");
    assert_eq!(created["final_price"], "17.00");
    assert_eq!(created["correlation_id"], "corr-http");

    let id = created["quote_id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/quotes/{id}"), "acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["quote_id"], id);

    let response = app
        .oneshot(get(&format!("/api/v1/quotes/{id}"), "someone-else"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn carrier_failure_maps_to_503_with_correlation_id() {
    let server = MockServer::start().await;
    mount_quote(&server, 502, json!({})).await;
    let app = app(&server, false);

    let response = app
        .oneshot(post_json("/api/v1/quotes", Some("acme"), &quote_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: ErrorResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(body.code, "CARRIER_TIMEOUT");
    assert_eq!(body.correlation_id, "corr-http");
}

#[tokio::test]
async fn invalid_requests_are_400() {
    let server = MockServer::start().await;
    let app = app(&server, false);

    let mut bad_postal = quote_body();
    bad_postal["origin_postal"] = json!("123");
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/quotes", Some("acme"), &bad_postal))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_ARGUMENT");

    let mut bad_carrier = quote_body();
    bad_carrier["carrier"] = json!("dhl");
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/quotes", Some("acme"), &bad_carrier))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "UNSUPPORTED_CARRIER");

    let response = app
        .oneshot(get("/api/v1/quotes?limit=0", "acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_client_is_401() {
    let server = MockServer::start().await;
    let app = app(&server, false);

    let response = app
        .oneshot(post_json("/api/v1/quotes", None, &quote_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["correlation_id"], "corr-http");
}

#[tokio::test]
async fn list_returns_page_for_caller() {
    let server = MockServer::start().await;
    mount_quote(&server, 200, frenet_reply(&[("03298", "PAC", "10.00")])).await;
    let app = app(&server, false);

    for _ in 0..2 {
        app.clone()
            .oneshot(post_json("/api/v1/quotes", Some("acme"), &quote_body()))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(get("/api/v1/quotes?limit=1&status=success&carrier=frenet", "acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["quotes"].as_array().unwrap().len(), 1);
    assert!(page["next_cursor"].is_string());

    let response = app
        .oneshot(get("/api/v1/quotes", "nobody"))
        .await
        .unwrap();
    let page = json_body(response).await;
    assert!(page["quotes"].as_array().unwrap().is_empty());
    assert!(page["next_cursor"].is_null());
}

#[tokio::test]
async fn label_endpoint_returns_pdf() {
    let server = MockServer::start().await;
    mount_quote(&server, 200, frenet_reply(&[("03298", "PAC", "10.00")])).await;
    let app = app(&server, false);

    let created = json_body(
        app.clone()
            .oneshot(post_json("/api/v1/quotes", Some("acme"), &quote_body()))
            .await
            .unwrap(),
    )
    .await;
    let id = created["quote_id"].as_str().unwrap();

    let response = app
        .oneshot(post_json(
            &format!("/api/v1/quotes/{id}/label"),
            Some("acme"),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    let label_id = response
        .headers()
        .get("x-label-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        response.headers().get("x-label-url").unwrap().to_str().unwrap(),
        format!("http://localhost:5173/labels/{label_id}")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn carriers_and_probe() {
    let server = MockServer::start().await;
    mount_quote(&server, 200, frenet_reply(&[("03298", "PAC", "10.00")])).await;

    let disabled = app(&server, false);
    let response = disabled
        .clone()
        .oneshot(get("/api/v1/carriers/frenet/test", "acme"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["status"], "disabled");

    let response = disabled
        .oneshot(get("/api/v1/carriers", "acme"))
        .await
        .unwrap();
    let carriers = json_body(response).await;
    assert_eq!(carriers["carriers"][0]["carrier"], "frenet");
    assert!(carriers["carriers"][0]["breaker"].is_null());

    let enabled = app(&server, true);
    let response = enabled
        .clone()
        .oneshot(get("/api/v1/carriers/frenet/test", "acme"))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["status"], "ok");

    let response = enabled
        .oneshot(get("/api/v1/carriers/ups/test", "acme"))
        .await
        .unwrap();
    let probe = json_body(response).await;
    assert_eq!(probe["status"], "error");
    assert_eq!(probe["error"], "UNSUPPORTED_CARRIER");
}

#[tokio::test]
async fn health_is_public() {
    let server = MockServer::start().await;
    let response = app(&server, false)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

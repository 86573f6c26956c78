//! Integration tests for the trigger listener.

mod helpers;

use axum::http::StatusCode;

use helpers::{ALLOWED, DENIED, TestApp};

#[tokio::test]
async fn test_trigger_broadcasts_call_in() {
    let app = TestApp::new().await;
    let (_sub, mut queue) = app.hub.register(None).await.expect("register");

    let response = app.trigger("token=s3cret&phone=5551234567").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text, "OK");
    assert_eq!(
        queue.recv().await.expect("payload"),
        r#"{"type":"CALL_IN","data":{"phone":"5551234567","exten":""}}"#
    );
}

#[tokio::test]
async fn test_trigger_forwards_extension() {
    let app = TestApp::new().await;
    let (_sub, mut queue) = app.hub.register(None).await.expect("register");

    let response = app.trigger("token=s3cret&phone=0312345678&exten=201").await;

    assert_eq!(response.status, StatusCode::OK);
    let payload: serde_json::Value =
        serde_json::from_str(&queue.recv().await.expect("payload")).expect("json");
    assert_eq!(payload["type"], "CALL_IN");
    assert_eq!(payload["data"]["phone"], "0312345678");
    assert_eq!(payload["data"]["exten"], "201");
}

#[tokio::test]
async fn test_trigger_without_subscribers_still_succeeds() {
    let app = TestApp::new().await;
    let response = app.trigger("token=s3cret&phone=100").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.hub.metrics().broadcasts, 1);
}

#[tokio::test]
async fn test_trigger_rejects_bad_token() {
    let app = TestApp::new().await;
    let (_sub, mut queue) = app.hub.register(None).await.expect("register");

    let wrong = app.trigger("token=nope&phone=5551234567").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "UNAUTHORIZED");

    let missing = app.trigger("phone=5551234567").await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    assert!(queue.try_recv().is_err());
}

#[tokio::test]
async fn test_trigger_requires_phone() {
    let app = TestApp::new().await;

    let missing = app.trigger("token=s3cret").await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["error"], "VALIDATION_ERROR");

    let empty = app.trigger("token=s3cret&phone=").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trigger_acl() {
    let app = TestApp::new().await;

    let denied = app
        .request(&app.trigger, "POST", "/api/trigger?token=s3cret&phone=1", DENIED)
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["message"], "Forbidden (ACL)");

    let cidr = app
        .request(&app.trigger, "POST", "/api/trigger?token=s3cret&phone=1", "10.20.30.40:5000")
        .await;
    assert_eq!(cidr.status, StatusCode::OK);

    let mapped = app
        .request(
            &app.trigger,
            "POST",
            "/api/trigger?token=s3cret&phone=1",
            "[::ffff:127.0.0.1]:5000",
        )
        .await;
    assert_eq!(mapped.status, StatusCode::OK);
}

#[tokio::test]
async fn test_trigger_only_accepts_post() {
    let app = TestApp::new().await;
    let response = app
        .request(&app.trigger, "GET", "/api/trigger?token=s3cret&phone=1", ALLOWED)
        .await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_trigger_route_not_on_client_listener() {
    let app = TestApp::new().await;
    let response = app
        .request(&app.client, "POST", "/api/trigger?token=s3cret&phone=1", ALLOWED)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let (_sub, _queue) = app.hub.register(None).await.expect("register");

    // Health is not behind an allow-list.
    let response = app.request(&app.trigger, "GET", "/api/health", DENIED).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["subscribers"], 1);
    assert!(response.body["uptime_seconds"].as_i64().expect("uptime") >= 0);
}

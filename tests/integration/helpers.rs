//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use popup_api::AppState;
use popup_api::router::{build_client_router, build_trigger_router};
use popup_core::config::AppConfig;
use popup_realtime::{Hub, HubHandle};

/// Shared trigger token in the test config.
pub const TOKEN: &str = "s3cret";

/// Address inside both allow-lists.
pub const ALLOWED: &str = "127.0.0.1:40000";

/// Address outside both allow-lists.
pub const DENIED: &str = "203.0.113.7:40000";

/// Test configuration: loopback allowed, manager interface disabled.
pub fn test_config() -> AppConfig {
    AppConfig::from_toml(
        r#"
        [server]
        host = "127.0.0.1"
        http_port = 0
        client_port = 1

        [access]
        secret_token = "s3cret"
        trigger_allow = ["127.0.0.1", "10.0.0.0/8"]
        crmws_allow = ["127.0.0.1"]

        [ami]
        enabled = false

        [realtime]
        queue_size = 16
        write_wait_seconds = 2
        "#,
    )
    .expect("Failed to load test config")
}

/// Test application context
pub struct TestApp {
    /// Shared state
    pub state: AppState,
    /// Router of the trigger listener
    pub trigger: Router,
    /// Router of the client listener
    pub client: Router,
    /// Hub handle for direct subscription
    pub hub: HubHandle,
    /// Hub task
    pub hub_task: JoinHandle<()>,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from an explicit config
    pub async fn with_config(config: AppConfig) -> Self {
        let (hub, hub_task) = Hub::spawn(&config.realtime);
        let state = AppState::new(config, hub.clone()).expect("Failed to build state");

        Self {
            trigger: build_trigger_router(state.clone()),
            client: build_client_router(state.clone()),
            state,
            hub,
            hub_task,
        }
    }

    /// Send a request to `router` as if it came from `remote`.
    pub async fn request(
        &self,
        router: &Router,
        method: &str,
        path: &str,
        remote: &str,
    ) -> TestResponse {
        let remote: SocketAddr = remote.parse().expect("Invalid remote address");
        let req = Request::builder()
            .method(method)
            .uri(path)
            .extension(ConnectInfo(remote))
            .body(Body::empty())
            .expect("Failed to build request");

        let response = router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            text: String::from_utf8_lossy(&body_bytes).into_owned(),
            body: serde_json::from_slice(&body_bytes).unwrap_or(Value::Null),
        }
    }

    /// `POST` to the trigger listener from an allowed address.
    pub async fn trigger(&self, query: &str) -> TestResponse {
        let path = format!("/api/trigger?{query}");
        self.request(&self.trigger, "POST", &path, ALLOWED).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Raw body
    pub text: String,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
}

/// Polls `check` until it holds or a second elapses.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

//! Integration tests for WebSocket subscribers over real sockets.

mod helpers;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use popup_core::config::AppConfig;

use helpers::{TestApp, eventually, test_config};

struct RunningServer {
    app: TestApp,
    client_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    server: JoinHandle<()>,
}

async fn start(config: AppConfig) -> RunningServer {
    let app = TestApp::with_config(config).await;
    let trigger = TcpListener::bind("127.0.0.1:0").await.expect("bind trigger");
    let client = TcpListener::bind("127.0.0.1:0").await.expect("bind client");
    let client_addr = client.local_addr().expect("addr");

    let (shutdown, rx) = watch::channel(false);
    let state = app.state.clone();
    let server = tokio::spawn(async move {
        popup_api::serve_with_listeners(state, trigger, client, rx)
            .await
            .expect("serve");
    });

    RunningServer {
        app,
        client_addr,
        shutdown,
        server,
    }
}

async fn next_text<S>(stream: &mut S) -> String
where
    S: StreamExt<Item = Result<Message, WsError>> + Unpin,
{
    let frame = tokio::time::timeout(Duration::from_secs(2), stream.next())
        .await
        .expect("frame in time")
        .expect("stream open")
        .expect("valid frame");
    match frame {
        Message::Text(text) => text.as_str().to_string(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn test_subscriber_receives_trigger_over_websocket() {
    let server = start(test_config()).await;
    let hub = server.app.hub.clone();

    let (mut ws, _) = connect_async(format!("ws://{}/crmws", server.client_addr))
        .await
        .expect("connect");
    eventually(|| hub.subscriber_count() == 1).await;

    let response = server
        .app
        .request(
            &server.app.trigger,
            "POST",
            "/api/trigger?token=s3cret&phone=5551234567",
            helpers::ALLOWED,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(
        next_text(&mut ws).await,
        r#"{"type":"CALL_IN","data":{"phone":"5551234567","exten":""}}"#
    );

    ws.close(None).await.expect("close");
    eventually(|| hub.subscriber_count() == 0).await;

    let _ = server.shutdown.send(true);
    hub.shutdown().await;
    server.server.await.expect("server task");
}

#[tokio::test]
async fn test_every_subscriber_gets_every_broadcast_in_order() {
    let server = start(test_config()).await;
    let hub = server.app.hub.clone();
    let url = format!("ws://{}/crmws", server.client_addr);

    let (mut first, _) = connect_async(url.as_str()).await.expect("connect first");
    let (mut second, _) = connect_async(url.as_str()).await.expect("connect second");
    eventually(|| hub.subscriber_count() == 2).await;

    for i in 0..5 {
        hub.broadcast(format!("msg-{i}")).await;
    }

    for ws in [&mut first, &mut second] {
        for i in 0..5 {
            assert_eq!(next_text(ws).await, format!("msg-{i}"));
        }
    }

    let _ = server.shutdown.send(true);
    hub.shutdown().await;
    server.server.await.expect("server task");
}

#[tokio::test]
async fn test_hub_shutdown_sends_close_frame() {
    let server = start(test_config()).await;
    let hub = server.app.hub.clone();

    let (mut ws, _) = connect_async(format!("ws://{}/crmws", server.client_addr))
        .await
        .expect("connect");
    eventually(|| hub.subscriber_count() == 1).await;

    let _ = server.shutdown.send(true);
    hub.shutdown().await;

    let frame = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("close in time");
    assert!(
        matches!(frame, Some(Ok(Message::Close(_))) | None),
        "unexpected frame: {frame:?}"
    );
    drop(ws);
    server.server.await.expect("server task");
}

#[tokio::test]
async fn test_stalled_client_socket_released_after_write_deadline() {
    let mut config = test_config();
    config.realtime.write_wait_seconds = 1;
    let server = start(config).await;
    let hub = server.app.hub.clone();

    // Never polled until the subscriber is gone, so server writes back up.
    let (mut ws, _) = connect_async(format!("ws://{}/crmws", server.client_addr))
        .await
        .expect("connect");
    eventually(|| hub.subscriber_count() == 1).await;

    let payload = "x".repeat(512 * 1024);
    let mut sent = 0;
    while hub.subscriber_count() > 0 {
        assert!(sent < 1000, "stalled subscriber was never torn down");
        hub.broadcast(payload.clone()).await;
        sent += 1;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // Once the server drops its socket the buffered frames drain and the
    // stream ends; an open server socket would leave this read pending.
    let drained = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match ws.next().await {
                Some(Ok(_)) => continue,
                Some(Err(_)) | None => break,
            }
        }
    })
    .await;
    assert!(
        drained.is_ok(),
        "server socket still open after the write deadline"
    );

    drop(ws);
    let _ = server.shutdown.send(true);
    hub.shutdown().await;
    server.server.await.expect("server task");
}

#[tokio::test]
async fn test_upgrade_denied_outside_allow_list() {
    let mut config = test_config();
    config.access.crmws_allow = vec!["10.9.9.9".to_string()];
    let server = start(config).await;

    let err = connect_async(format!("ws://{}/crmws", server.client_addr))
        .await
        .expect_err("must be denied");
    match err {
        WsError::Http(response) => assert_eq!(response.status().as_u16(), 403),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.app.hub.subscriber_count(), 0);

    let _ = server.shutdown.send(true);
    server.app.hub.shutdown().await;
    server.server.await.expect("server task");
}

#[tokio::test]
async fn test_plain_get_on_crmws_is_not_an_upgrade() {
    let app = TestApp::new().await;
    let response = app
        .request(&app.client, "GET", "/crmws", helpers::ALLOWED)
        .await;
    assert!(
        response.status.is_client_error(),
        "expected 4xx, got {}",
        response.status
    );
    assert_eq!(app.hub.subscriber_count(), 0);
}

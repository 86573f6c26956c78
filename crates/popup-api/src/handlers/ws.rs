//! WebSocket upgrade handler for real-time clients.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::response::Response;
use futures::StreamExt;
use futures::stream::SplitStream;
use tracing::{debug, info, warn};

use popup_realtime::{SubscriberId, run_writer};

use crate::state::AppState;

/// GET /crmws: WebSocket upgrade
///
/// The allow-list has already been checked by the route layer.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_ws_connection(state, remote, socket))
}

/// Registers the connection, runs the write pump, and discards inbound
/// frames until the client goes away or the write pump gives up.
async fn handle_ws_connection(state: AppState, remote: SocketAddr, socket: WebSocket) {
    let (subscriber, queue) = match state.hub.register(Some(remote)).await {
        Ok(registration) => registration,
        Err(e) => {
            warn!(remote = %remote, error = %e, "Rejecting WebSocket client");
            return;
        }
    };
    let sub_id = subscriber.id;

    info!(subscriber_id = %sub_id, remote = %remote, "WebSocket connection established");

    let (ws_tx, mut ws_rx) = socket.split();
    let write_wait = Duration::from_secs(state.config.realtime.write_wait_seconds);
    let mut writer = tokio::spawn(run_writer(
        subscriber,
        queue,
        ws_tx,
        state.hub.clone(),
        write_wait,
    ));

    let exit = tokio::select! {
        // The writer gave up on the transport; stop reading so the socket is released.
        exit = &mut writer => exit,
        () = read_until_closed(&mut ws_rx, sub_id) => {
            // Closing the queue lets the writer finish with a close frame.
            state.hub.unregister(sub_id).await;
            writer.await
        }
    };
    drop(ws_rx);

    match exit {
        Ok(exit) => info!(subscriber_id = %sub_id, exit = ?exit, "WebSocket connection closed"),
        Err(e) => warn!(subscriber_id = %sub_id, error = %e, "Writer task failed"),
    }
}

/// Discards inbound frames until the client closes or the read fails.
async fn read_until_closed(ws_rx: &mut SplitStream<WebSocket>, sub_id: SubscriberId) {
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(subscriber_id = %sub_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }
}

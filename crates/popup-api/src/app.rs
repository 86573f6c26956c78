//! Listener wiring: binds both ports and serves until shutdown.

use std::future::IntoFuture;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use popup_core::AppResult;
use popup_core::error::{AppError, ErrorKind};

use crate::router::{build_client_router, build_trigger_router};
use crate::state::AppState;

/// Binds the trigger and client listeners from `server` config.
pub async fn bind_listeners(state: &AppState) -> AppResult<(TcpListener, TcpListener)> {
    let server = &state.config.server;
    let trigger = bind(server.http_addr()).await?;
    let client = bind(server.client_addr()).await?;
    Ok((trigger, client))
}

async fn bind(addr: String) -> AppResult<TcpListener> {
    TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Io, format!("Failed to bind {addr}"), e))
}

/// Binds both listeners and serves until `shutdown` turns true.
pub async fn serve(state: AppState, shutdown: watch::Receiver<bool>) -> AppResult<()> {
    let (trigger, client) = bind_listeners(&state).await?;
    serve_with_listeners(state, trigger, client, shutdown).await
}

/// Serves both routers on already-bound listeners.
///
/// Remote addresses are captured per connection so the allow-list
/// middleware can see them.
pub async fn serve_with_listeners(
    state: AppState,
    trigger_listener: TcpListener,
    client_listener: TcpListener,
    shutdown: watch::Receiver<bool>,
) -> AppResult<()> {
    info!(addr = ?trigger_listener.local_addr().ok(), "Trigger listener ready");
    info!(addr = ?client_listener.local_addr().ok(), "Client listener ready");

    let trigger = axum::serve(
        trigger_listener,
        build_trigger_router(state.clone()).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()))
    .into_future();

    let client = axum::serve(
        client_listener,
        build_client_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown(shutdown))
    .into_future();

    tokio::try_join!(trigger, client)?;

    info!("Listeners shut down");
    Ok(())
}

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

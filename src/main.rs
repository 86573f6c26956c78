//! Popup Notifier: call-event popups for CRM clients
//!
//! Main entry point that wires all crates together and starts the server.

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use popup_ami::AmiPipeline;
use popup_api::AppState;
use popup_core::config::AppConfig;
use popup_core::AppResult;
use popup_realtime::{Hub, HubHandle};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "popup-notifier", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "/usr/local/etc/popup-notifier.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from '{}': {}", cli.config, e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting popup-notifier v{}", env!("CARGO_PKG_VERSION"));

    let (hub, hub_task) = Hub::spawn(&config.realtime);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState::new(config.clone(), hub.clone())?;

    let pipeline_task = if config.ami.enabled {
        let pipeline = AmiPipeline::new(config.ami.clone(), hub.clone());
        let shutdown = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = pipeline.run(shutdown).await {
                tracing::error!(
                    error = %e,
                    "Call-event pipeline stopped; trigger ingress keeps running"
                );
            }
        }))
    } else {
        tracing::info!("Manager interface disabled, serving trigger ingress only");
        None
    };

    tokio::spawn(signal_shutdown(shutdown_tx, hub.clone()));

    popup_api::serve(state, shutdown_rx).await?;

    if let Some(task) = pipeline_task {
        let _ = task.await;
    }
    hub.shutdown().await;
    let _ = hub_task.await;

    tracing::info!("popup-notifier shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM, then stops the pipeline and the hub.
///
/// Stopping the hub closes every subscriber queue, which lets open
/// WebSocket connections finish so graceful shutdown can complete.
async fn signal_shutdown(shutdown_tx: watch::Sender<bool>, hub: HubHandle) {
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);
    hub.shutdown().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

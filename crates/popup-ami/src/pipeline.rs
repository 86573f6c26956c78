//! The call-event pipeline: read → track → correlate → publish.
//!
//! One task owns the connection, the tracker, and the publisher handle.
//! Events are applied strictly in arrival order.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use popup_core::config::ami::AmiConfig;
use popup_core::traits::NotificationPublisher;

use crate::client::AmiClient;
use crate::error::{AmiError, AmiResult};
use crate::protocol::AmiEvent;
use crate::tracker::ChannelTracker;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown was requested; logoff has been sent.
    Shutdown,
    /// The server closed the connection.
    StreamClosed,
}

enum Step {
    Stop,
    Read(AmiResult<AmiEvent>),
}

/// Long-running consumer of manager events.
pub struct AmiPipeline<P> {
    config: AmiConfig,
    tracker: ChannelTracker,
    publisher: P,
}

impl<P: NotificationPublisher> AmiPipeline<P> {
    /// Creates a pipeline publishing notifications through `publisher`.
    pub fn new(config: AmiConfig, publisher: P) -> Self {
        Self {
            tracker: ChannelTracker::from_config(&config),
            config,
            publisher,
        }
    }

    /// The channel tracker, for inspection.
    pub fn tracker(&self) -> &ChannelTracker {
        &self.tracker
    }

    /// Connects, logs in, and consumes events until shutdown.
    ///
    /// A closed stream, a timeout, or a socket error leads to a reconnect
    /// after `reconnect_delay_ms`. A rejected login stops the loop and is
    /// returned to the caller.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> AmiResult<()> {
        let delay = Duration::from_millis(self.config.reconnect_delay_ms);

        loop {
            let connected = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => return Ok(()),
                result = AmiClient::connect(&self.config) => result,
            };

            let outcome = match connected {
                Ok(client) => self.run_session(client, &mut shutdown).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(SessionEnd::Shutdown) => {
                    info!("Call-event pipeline stopped");
                    return Ok(());
                }
                Ok(SessionEnd::StreamClosed) => {
                    warn!(host = %self.config.host, "Manager connection closed, reconnecting");
                }
                Err(e) if e.is_terminal() => {
                    error!(host = %self.config.host, error = %e, "Manager login rejected, giving up");
                    return Err(e);
                }
                Err(e) => {
                    warn!(host = %self.config.host, error = %e, "Manager session failed, reconnecting");
                }
            }

            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Runs one session over an already-open transport.
    ///
    /// Logs in, resets the tracker, then applies events until the stream
    /// closes or shutdown is signalled. Malformed frames are logged and
    /// skipped.
    pub async fn run_session<S>(
        &mut self,
        mut client: AmiClient<S>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> AmiResult<SessionEnd>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        client
            .login(&self.config.username, &self.config.secret)
            .await?;
        self.tracker.clear();

        loop {
            let step = tokio::select! {
                biased;
                _ = wait_for_shutdown(shutdown) => Step::Stop,
                event = client.next_event() => Step::Read(event),
            };

            let event = match step {
                Step::Stop => {
                    client.logoff().await;
                    return Ok(SessionEnd::Shutdown);
                }
                Step::Read(Ok(event)) => event,
                Step::Read(Err(AmiError::StreamClosed)) => return Ok(SessionEnd::StreamClosed),
                Step::Read(Err(e)) if e.is_recoverable_in_session() => {
                    warn!(error = %e, "Discarding malformed manager frame");
                    continue;
                }
                Step::Read(Err(e)) => return Err(e),
            };

            if let Some(notification) = self.tracker.apply(&event) {
                info!(
                    internal_channel = %notification.internal_channel,
                    caller_id = %notification.external_caller_id,
                    linked_id = %notification.linked_id,
                    "Internal extension bridged with external caller"
                );
                self.publisher.publish(notification.into()).await;
            } else {
                debug!(event = event.event_name().unwrap_or(""), "Event applied");
            }
        }
    }
}

/// Resolves once shutdown is requested or the sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

//! Outbound write pump for one subscriber.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::hub::HubHandle;

use super::handle::SubscriberHandle;

/// Why a write pump stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterExit {
    /// The hub closed the queue (unregistered or dropped as slow).
    QueueClosed,
    /// The transport rejected a write.
    WriteFailed(String),
    /// A write did not finish within the deadline.
    DeadlineExceeded,
}

/// Drains `queue` into `sink` until the queue closes or a write fails.
///
/// Every write, including the closing handshake, is bounded by
/// `write_wait`. On exit the subscriber is unregistered once and the sink
/// is closed.
pub async fn run_writer<S>(
    subscriber: SubscriberHandle,
    mut queue: mpsc::Receiver<String>,
    mut sink: S,
    hub: HubHandle,
    write_wait: Duration,
) -> WriterExit
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let exit = loop {
        let Some(payload) = queue.recv().await else {
            if let Ok(Err(e)) = timeout(write_wait, sink.send(Message::Close(None))).await {
                debug!(subscriber_id = %subscriber.id, error = %e, "Close frame not delivered");
            }
            break WriterExit::QueueClosed;
        };

        match timeout(write_wait, sink.send(Message::Text(payload.into()))).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => break WriterExit::WriteFailed(e.to_string()),
            Err(_) => break WriterExit::DeadlineExceeded,
        }
    };

    match &exit {
        WriterExit::QueueClosed => {
            info!(subscriber_id = %subscriber.id, "Subscriber queue closed");
        }
        WriterExit::WriteFailed(reason) => {
            warn!(subscriber_id = %subscriber.id, error = %reason, "Subscriber write failed");
        }
        WriterExit::DeadlineExceeded => {
            warn!(
                subscriber_id = %subscriber.id,
                write_wait_secs = write_wait.as_secs(),
                "Subscriber write deadline exceeded"
            );
        }
    }

    hub.unregister(subscriber.id).await;
    let _ = timeout(write_wait, sink.close()).await;
    exit
}

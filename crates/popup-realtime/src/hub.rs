//! Notification hub: one task owns every subscriber queue.
//!
//! Register, unregister, and broadcast requests are messages on a single
//! command channel, so the subscriber set is never touched concurrently and
//! no lock is held while delivering.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use popup_core::config::realtime::RealtimeConfig;
use popup_core::error::AppError;
use popup_core::events::OutboundMessage;
use popup_core::traits::NotificationPublisher;

use crate::connection::handle::{SubscriberHandle, SubscriberId};
use crate::metrics::{HubMetrics, HubMetricsSnapshot};

enum HubCommand {
    Register {
        subscriber: SubscriberHandle,
        ack: oneshot::Sender<mpsc::Receiver<String>>,
    },
    Unregister {
        id: SubscriberId,
    },
    Broadcast {
        payload: String,
        ack: oneshot::Sender<usize>,
    },
    Shutdown,
}

struct Subscriber {
    handle: SubscriberHandle,
    queue: mpsc::Sender<String>,
}

/// The hub task state.
pub struct Hub {
    subscribers: HashMap<SubscriberId, Subscriber>,
    queue_size: usize,
    commands: mpsc::Receiver<HubCommand>,
    metrics: Arc<HubMetrics>,
}

impl Hub {
    /// Spawns the hub task and returns a handle to it.
    pub fn spawn(config: &RealtimeConfig) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
        let metrics = Arc::new(HubMetrics::new());

        let hub = Self {
            subscribers: HashMap::new(),
            queue_size: config.queue_size.max(1),
            commands: rx,
            metrics: metrics.clone(),
        };
        let task = tokio::spawn(hub.run());

        info!(
            queue_size = config.queue_size,
            command_buffer = config.command_buffer,
            "Notification hub started"
        );
        (HubHandle { commands: tx, metrics }, task)
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register { subscriber, ack } => self.register(subscriber, ack),
                HubCommand::Unregister { id } => self.unregister(id),
                HubCommand::Broadcast { payload, ack } => {
                    let delivered = self.broadcast(payload);
                    let _ = ack.send(delivered);
                }
                HubCommand::Shutdown => break,
            }
        }

        let remaining = self.subscribers.len();
        self.subscribers.clear();
        self.metrics.set_active(0);
        info!(closed = remaining, "Notification hub stopped");
    }

    fn register(
        &mut self,
        subscriber: SubscriberHandle,
        ack: oneshot::Sender<mpsc::Receiver<String>>,
    ) {
        let (tx, rx) = mpsc::channel(self.queue_size);
        if ack.send(rx).is_err() {
            debug!(subscriber_id = %subscriber.id, "Registration abandoned by caller");
            return;
        }

        let id = subscriber.id;
        let remote = subscriber.remote_addr;
        self.subscribers.insert(
            id,
            Subscriber {
                handle: subscriber,
                queue: tx,
            },
        );
        self.metrics.subscriber_added();

        info!(
            subscriber_id = %id,
            remote = ?remote,
            total = self.subscribers.len(),
            "Subscriber registered"
        );
    }

    fn unregister(&mut self, id: SubscriberId) {
        // Dropping the sender closes the queue; the write pump sees the end.
        let Some(removed) = self.subscribers.remove(&id) else {
            return;
        };
        self.metrics.set_active(self.subscribers.len());

        info!(
            subscriber_id = %id,
            connected_secs = removed.handle.connected_secs(),
            total = self.subscribers.len(),
            "Subscriber unregistered"
        );
    }

    fn broadcast(&mut self, payload: String) -> usize {
        let mut delivered = 0;
        let mut stale = Vec::new();

        for (id, subscriber) in &self.subscribers {
            match subscriber.queue.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber_id = %id, "Subscriber queue full, dropping subscriber");
                    stale.push((*id, true));
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(subscriber_id = %id, "Subscriber queue closed");
                    stale.push((*id, false));
                }
            }
        }

        let dropped = stale.iter().filter(|(_, slow)| *slow).count();
        for (id, _) in stale {
            self.unregister(id);
        }
        self.metrics.broadcast(delivered, dropped);

        debug!(delivered, dropped, "Broadcast delivered");
        delivered
    }
}

/// Cloneable handle to the hub task.
///
/// Every method is safe to call from any number of tasks concurrently.
/// Once the hub has stopped, registration fails and the other operations
/// become no-ops.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    metrics: Arc<HubMetrics>,
}

impl std::fmt::Debug for HubHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandle")
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

impl HubHandle {
    /// Registers a new subscriber.
    ///
    /// Returns once the subscriber is visible to every broadcast issued
    /// afterwards, with the receiving end of its delivery queue.
    pub async fn register(
        &self,
        remote_addr: Option<SocketAddr>,
    ) -> Result<(SubscriberHandle, mpsc::Receiver<String>), AppError> {
        let subscriber = SubscriberHandle::new(remote_addr);
        let (ack, wait) = oneshot::channel();

        self.commands
            .send(HubCommand::Register {
                subscriber: subscriber.clone(),
                ack,
            })
            .await
            .map_err(|_| AppError::service_unavailable("Notification hub is not running"))?;

        let queue = wait
            .await
            .map_err(|_| AppError::service_unavailable("Notification hub is not running"))?;
        Ok((subscriber, queue))
    }

    /// Removes a subscriber and closes its queue. Unknown or already
    /// removed IDs are ignored.
    pub async fn unregister(&self, id: SubscriberId) {
        if self.commands.send(HubCommand::Unregister { id }).await.is_err() {
            debug!(subscriber_id = %id, "Hub already stopped, nothing to unregister");
        }
    }

    /// Queues `payload` to every registered subscriber and returns how many
    /// accepted it.
    pub async fn broadcast(&self, payload: String) -> usize {
        let (ack, wait) = oneshot::channel();
        if self
            .commands
            .send(HubCommand::Broadcast { payload, ack })
            .await
            .is_err()
        {
            warn!("Hub stopped, broadcast discarded");
            return 0;
        }
        wait.await.unwrap_or(0)
    }

    /// Serializes and broadcasts a message.
    pub async fn broadcast_message(&self, message: &OutboundMessage) -> Result<usize, AppError> {
        let payload = message.to_json()?;
        Ok(self.broadcast(payload).await)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.metrics.snapshot().subscribers_active as usize
    }

    /// Current counters.
    pub fn metrics(&self) -> HubMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stops the hub; every subscriber queue is closed.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(HubCommand::Shutdown).await;
    }
}

#[async_trait]
impl NotificationPublisher for HubHandle {
    async fn publish(&self, message: OutboundMessage) {
        match self.broadcast_message(&message).await {
            Ok(delivered) => debug!(kind = message.kind(), delivered, "Notification published"),
            Err(e) => error!(kind = message.kind(), error = %e, "Failed to encode notification"),
        }
    }
}

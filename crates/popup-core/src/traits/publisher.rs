//! Seam between notification producers and the broadcaster.

use async_trait::async_trait;

use crate::events::OutboundMessage;

/// Accepts notifications for fan-out to every connected client.
///
/// Publishing is fire-and-forget: implementations must not report
/// per-subscriber delivery failures back to the producer.
#[async_trait]
pub trait NotificationPublisher: Send + Sync + 'static {
    /// Hand a message to the broadcaster.
    async fn publish(&self, message: OutboundMessage);
}

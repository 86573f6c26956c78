//! Identity of a single subscriber connection.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique subscriber identifier
pub type SubscriberId = Uuid;

/// Metadata about one connected real-time client.
///
/// The delivery queue itself lives inside the hub; this handle is what the
/// connection task keeps to unregister itself and to label its logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberHandle {
    /// Unique subscriber ID
    pub id: SubscriberId,
    /// Remote address, when known
    pub remote_addr: Option<SocketAddr>,
    /// When the subscriber was registered
    pub connected_at: DateTime<Utc>,
}

impl SubscriberHandle {
    /// Create a handle with a fresh ID
    pub fn new(remote_addr: Option<SocketAddr>) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote_addr,
            connected_at: Utc::now(),
        }
    }

    /// Seconds since registration
    pub fn connected_secs(&self) -> i64 {
        (Utc::now() - self.connected_at).num_seconds()
    }
}

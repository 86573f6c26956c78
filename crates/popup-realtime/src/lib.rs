//! # popup-realtime
//!
//! Real-time fan-out for the popup notifier. Provides:
//!
//! - The notification hub: a single task owning every subscriber queue,
//!   driven through a cloneable [`HubHandle`]
//! - The per-subscriber write pump that drains a queue into a WebSocket
//! - Hub counters exposed through the health endpoint

pub mod connection;
pub mod hub;
pub mod metrics;

pub use connection::handle::{SubscriberHandle, SubscriberId};
pub use connection::writer::{WriterExit, run_writer};
pub use hub::{Hub, HubHandle};
pub use metrics::{HubMetrics, HubMetricsSnapshot};

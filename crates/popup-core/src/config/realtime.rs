//! Real-time broadcaster configuration.

use serde::{Deserialize, Serialize};

/// Notification hub and subscriber connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Bound of each subscriber's delivery queue. A subscriber whose queue
    /// is full when a broadcast arrives is dropped.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
    /// Deadline for a single outbound write, in seconds.
    #[serde(default = "default_write_wait")]
    pub write_wait_seconds: u64,
    /// Bound of the hub's command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            queue_size: default_queue_size(),
            write_wait_seconds: default_write_wait(),
            command_buffer: default_command_buffer(),
        }
    }
}

fn default_queue_size() -> usize {
    256
}

fn default_write_wait() -> u64 {
    10
}

fn default_command_buffer() -> usize {
    1024
}

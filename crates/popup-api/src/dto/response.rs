//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Subscribers currently registered with the hub.
    pub subscribers: u64,
    /// Seconds since startup.
    pub uptime_seconds: i64,
    /// Broadcasts processed by the hub.
    pub broadcasts: u64,
    /// Subscribers dropped for falling behind.
    pub dropped: u64,
}

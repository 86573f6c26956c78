//! Trigger authentication and IP allow-list configuration.

use serde::{Deserialize, Serialize};

/// Access-control settings for both listeners.
///
/// Allow-lists hold IP literals or CIDR blocks. An empty list denies every
/// caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Shared token required in the `token` query parameter of trigger requests.
    pub secret_token: String,
    /// Callers allowed to hit `/api/trigger`.
    #[serde(default)]
    pub trigger_allow: Vec<String>,
    /// Callers allowed to open `/crmws`.
    #[serde(default)]
    pub crmws_allow: Vec<String>,
}

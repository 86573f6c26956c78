//! Manager-protocol connection and channel classification configuration.

use serde::{Deserialize, Serialize};

/// Manager-protocol (AMI) client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmiConfig {
    /// Whether to run the call-event pipeline at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `host:port` of the manager interface.
    #[serde(default)]
    pub host: String,
    /// Login username.
    #[serde(default)]
    pub username: String,
    /// Login secret.
    #[serde(default)]
    pub secret: String,
    /// Substrings that mark a channel name as an external trunk.
    #[serde(default)]
    pub external_trunks: Vec<String>,
    /// Channel-name prefixes of extension technologies (internal phones).
    #[serde(default = "default_internal_prefixes")]
    pub internal_prefixes: Vec<String>,
    /// Prefix of local-routing channels, never treated as a bridge endpoint.
    #[serde(default = "default_local_prefix")]
    pub local_prefix: String,
    /// Delay before reconnecting after the stream closes, in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Read liveness timeout in seconds (0 = wait forever).
    #[serde(default)]
    pub read_timeout_seconds: u64,
}

impl Default for AmiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            username: String::new(),
            secret: String::new(),
            external_trunks: Vec::new(),
            internal_prefixes: default_internal_prefixes(),
            local_prefix: default_local_prefix(),
            reconnect_delay_ms: default_reconnect_delay(),
            read_timeout_seconds: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_internal_prefixes() -> Vec<String> {
    vec!["SIP/".to_string(), "PJSIP/".to_string()]
}

fn default_local_prefix() -> String {
    "Local/".to_string()
}

fn default_reconnect_delay() -> u64 {
    500
}

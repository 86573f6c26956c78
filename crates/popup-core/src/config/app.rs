//! Listener configuration.

use serde::{Deserialize, Serialize};

/// HTTP/WebSocket listener configuration.
///
/// Trigger requests and real-time clients are served on separate ports so
/// each can be exposed (or firewalled) independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port for the trigger ingress (`POST /api/trigger`).
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Port for real-time clients (`GET /crmws`).
    #[serde(default = "default_client_port")]
    pub client_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            client_port: default_client_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the trigger listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// `host:port` for the client listener.
    pub fn client_addr(&self) -> String {
        format!("{}:{}", self.host, self.client_port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8989
}

fn default_client_port() -> u16 {
    8990
}

//! Application configuration schemas.
//!
//! All configuration structs are deserialized from a TOML file via the
//! `config` crate, overlaid with `POPUP__`-prefixed environment variables.
//! Each sub-module represents a logical configuration section.

pub mod access;
pub mod ami;
pub mod app;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

use self::access::AccessConfig;
use self::ami::AmiConfig;
use self::app::ServerConfig;
use self::logging::LoggingConfig;
use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: &[&str] = &[
    "access.trigger_allow",
    "access.crmws_allow",
    "ami.external_trunks",
    "ami.internal_prefixes",
];

/// `POPUP__SECTION__KEY` environment overlay.
fn env_source() -> config::Environment {
    let mut env = config::Environment::with_prefix("POPUP")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in LIST_KEYS {
        env = env.with_list_parse_key(key);
    }
    env
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Trigger token and IP allow-lists.
    pub access: AccessConfig,
    /// Manager-protocol connection and channel classification.
    #[serde(default)]
    pub ami: AmiConfig,
    /// Broadcaster and subscriber settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional so a deployment may be configured purely from
    /// environment variables (`POPUP__AMI__HOST=...`). The merged result is
    /// validated before being returned.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: &str, env: config::Environment) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML string.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access.secret_token.trim().is_empty() {
            return Err(AppError::configuration("access.secret_token is missing"));
        }
        if self.ami.enabled && self.ami.host.trim().is_empty() {
            return Err(AppError::configuration(
                "ami.host is required when ami.enabled is true",
            ));
        }
        if self.realtime.queue_size == 0 {
            return Err(AppError::configuration(
                "realtime.queue_size must be greater than zero",
            ));
        }
        if self.realtime.write_wait_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.write_wait_seconds must be greater than zero",
            ));
        }
        if self.server.http_port == self.server.client_port {
            return Err(AppError::configuration(format!(
                "server.http_port and server.client_port must differ (both {})",
                self.server.http_port
            )));
        }
        Ok(())
    }
}

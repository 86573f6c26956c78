//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use popup_core::config::AppConfig;
use popup_core::AppResult;
use popup_realtime::HubHandle;

use crate::middleware::acl::AccessList;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Notification hub
    pub hub: HubHandle,
    /// Parsed `access.trigger_allow`
    pub trigger_acl: Arc<AccessList>,
    /// Parsed `access.crmws_allow`
    pub client_acl: Arc<AccessList>,
    /// Process start time, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Builds the state, parsing both allow-lists.
    pub fn new(config: AppConfig, hub: HubHandle) -> AppResult<Self> {
        let trigger_acl = AccessList::parse(&config.access.trigger_allow)?;
        let client_acl = AccessList::parse(&config.access.crmws_allow)?;

        if trigger_acl.is_empty() {
            tracing::warn!("access.trigger_allow is empty, every trigger request will be denied");
        }
        if client_acl.is_empty() {
            tracing::warn!("access.crmws_allow is empty, every client connection will be denied");
        }

        Ok(Self {
            config: Arc::new(config),
            hub,
            trigger_acl: Arc::new(trigger_acl),
            client_acl: Arc::new(client_acl),
            started_at: Utc::now(),
        })
    }
}

//! # popup-api
//!
//! HTTP layer for the popup notifier built on Axum.
//!
//! Two listeners: the trigger listener accepts `POST /api/trigger` from the
//! call-control dialplan, and the client listener upgrades `GET /crmws` to
//! a WebSocket subscribed to the notification hub. Both expose
//! `GET /api/health` and are guarded by per-listener IP allow-lists.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{bind_listeners, serve, serve_with_listeners};
pub use middleware::acl::AccessList;
pub use state::AppState;

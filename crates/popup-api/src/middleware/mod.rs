//! Axum middleware stack.

pub mod acl;
pub mod logging;

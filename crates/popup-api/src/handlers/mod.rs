//! Request handlers.

pub mod health;
pub mod trigger;
pub mod ws;

//! # popup-core
//!
//! Core crate for the popup notifier. Contains configuration schemas,
//! the call notification events published to real-time clients, the
//! publisher trait that decouples event producers from the broadcaster,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other popup crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;

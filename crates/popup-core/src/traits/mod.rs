//! Core traits defined in `popup-core` and implemented by other crates.

pub mod publisher;

pub use publisher::NotificationPublisher;

//! Subscriber connection lifecycle.

pub mod handle;
pub mod writer;

//! # popup-ami
//!
//! Call-event side of the popup notifier:
//!
//! - Manager-protocol framing and event decoding ([`protocol`])
//! - Login/logoff handshake and event reads ([`client::AmiClient`])
//! - Per-channel lifecycle state ([`tracker::ChannelTracker`])
//! - Internal/external bridge detection ([`correlator`])
//! - The sequential read → track → correlate → publish loop with
//!   reconnect policy ([`pipeline::AmiPipeline`])

pub mod client;
pub mod correlator;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod tracker;

pub use client::AmiClient;
pub use error::{AmiError, AmiResult};
pub use pipeline::{AmiPipeline, SessionEnd};
pub use tracker::ChannelTracker;

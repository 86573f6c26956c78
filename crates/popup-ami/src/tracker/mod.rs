//! Channel state tracking.

pub mod channel;
pub mod classifier;
pub mod state;

pub use channel::CallChannel;
pub use classifier::ChannelClassifier;
pub use state::ChannelTracker;

//! Events published to real-time clients.
//!
//! Two producers feed the broadcaster: the call-event pipeline, which
//! emits [`CallBridged`] when an internal extension answers an external
//! call, and the trigger ingress, which forwards [`CallIn`] requests.

pub mod call;

use serde::{Deserialize, Serialize};

pub use call::{CallBridged, CallIn, CallInData};

use crate::error::AppError;

/// Union of everything that can be pushed to a subscriber.
///
/// Each variant carries its own wire shape, so the enum itself adds no
/// tag of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    /// Internal extension bridged with an external caller.
    CallBridged(CallBridged),
    /// Trigger forwarded from the call-control dialplan.
    CallIn(CallIn),
}

impl OutboundMessage {
    /// Serializes the message into the JSON text frame sent to clients.
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CallBridged(_) => "call_bridged",
            Self::CallIn(_) => "CALL_IN",
        }
    }
}

impl From<CallBridged> for OutboundMessage {
    fn from(event: CallBridged) -> Self {
        Self::CallBridged(event)
    }
}

impl From<CallIn> for OutboundMessage {
    fn from(event: CallIn) -> Self {
        Self::CallIn(event)
    }
}

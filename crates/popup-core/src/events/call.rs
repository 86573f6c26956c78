//! Call notification payloads and their exact wire formats.

use serde::{Deserialize, Serialize};

/// Emitted once per completed internal/external bridge.
///
/// Wire format:
/// `{"event":"call_bridged","internal_channel":..,"external_caller_id":..,"external_caller_name":..,"uniqueid":..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename = "call_bridged")]
pub struct CallBridged {
    /// Channel name of the answering internal extension.
    pub internal_channel: String,
    /// Caller number of the external leg.
    pub external_caller_id: String,
    /// Caller name of the external leg.
    pub external_caller_name: String,
    /// Linked id shared by both legs.
    #[serde(rename = "uniqueid")]
    pub linked_id: String,
}

/// Incoming-call trigger forwarded to clients.
///
/// Wire format: `{"type":"CALL_IN","data":{"phone":..,"exten":..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CallIn {
    /// The only trigger kind currently defined.
    #[serde(rename = "CALL_IN")]
    Incoming(CallInData),
}

/// Body of a [`CallIn`] trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInData {
    /// Calling number.
    pub phone: String,
    /// Target extension, empty when unknown.
    pub exten: String,
}

impl CallIn {
    /// Builds an incoming-call trigger.
    pub fn new(phone: impl Into<String>, exten: impl Into<String>) -> Self {
        Self::Incoming(CallInData {
            phone: phone.into(),
            exten: exten.into(),
        })
    }

    /// The calling number.
    pub fn phone(&self) -> &str {
        match self {
            Self::Incoming(data) => &data.phone,
        }
    }
}

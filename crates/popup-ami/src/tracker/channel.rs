//! Per-channel record.

/// One live call channel, keyed by `channel_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallChannel {
    /// Unique channel identifier (`Uniqueid`).
    pub channel_id: String,
    /// Correlation key shared by the legs of one call (`Linkedid`).
    pub linked_id: String,
    /// Technology channel name, e.g. `SIP/101-00000001`.
    pub channel_name: String,
    /// Caller number captured at creation.
    pub caller_number: String,
    /// Caller name captured at creation.
    pub caller_name: String,
    /// Classified once at creation; never changes.
    pub is_internal: bool,
    /// The channel has reached the answered state.
    pub is_up: bool,
    /// The channel entered a bridge and has not yet triggered a notification.
    pub is_bridge_candidate: bool,
    /// A notification was already emitted for this channel; later bridge
    /// membership signals do not re-arm it.
    pub popup_sent: bool,
}

impl CallChannel {
    /// Creates a fresh record with no state flags set.
    pub fn new(
        channel_id: impl Into<String>,
        linked_id: impl Into<String>,
        channel_name: impl Into<String>,
        is_internal: bool,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            linked_id: linked_id.into(),
            channel_name: channel_name.into(),
            caller_number: String::new(),
            caller_name: String::new(),
            is_internal,
            is_up: false,
            is_bridge_candidate: false,
            popup_sent: false,
        }
    }

    /// Sets caller identity unless already captured.
    pub fn set_caller_if_unset(&mut self, number: &str, name: &str) {
        if self.caller_number.is_empty() {
            self.caller_number = number.to_string();
            self.caller_name = name.to_string();
        }
    }
}

//! Channel state tracker: applies decoded events to the live channel set.

use tracing::{debug, trace};

use popup_core::config::ami::AmiConfig;
use popup_core::events::CallBridged;

use crate::correlator::{self, ChannelTable};
use crate::protocol::{AmiEvent, ChannelEventKind};

use super::channel::CallChannel;
use super::classifier::ChannelClassifier;

/// Owns every live channel record.
///
/// Not shared: the pipeline task holds the only instance and applies
/// events one at a time, so "find partner, then trigger" never interleaves
/// with another mutation.
#[derive(Debug, Default)]
pub struct ChannelTracker {
    channels: ChannelTable,
    classifier: ChannelClassifier,
}

impl ChannelTracker {
    /// Creates an empty tracker.
    pub fn new(classifier: ChannelClassifier) -> Self {
        Self {
            channels: ChannelTable::new(),
            classifier,
        }
    }

    /// Creates an empty tracker classifying with the `[ami]` settings.
    pub fn from_config(config: &AmiConfig) -> Self {
        Self::new(ChannelClassifier::from_config(config))
    }

    /// Applies one event. Returns a notification when this event completed
    /// an internal/external bridge.
    ///
    /// Unknown event kinds, events without a channel id, and events for
    /// channels never created are ignored.
    pub fn apply(&mut self, event: &AmiEvent) -> Option<CallBridged> {
        let Some(kind) = event.channel_kind() else {
            trace!(event = event.event_name().unwrap_or(""), "Ignoring untracked event");
            return None;
        };

        let channel_id = event.field("Uniqueid");
        if channel_id.is_empty() {
            debug!(event = ?kind, "Ignoring channel event without Uniqueid");
            return None;
        }

        match kind {
            ChannelEventKind::Created => {
                self.on_created(channel_id, event);
                None
            }
            ChannelEventKind::StateChanged => {
                self.on_state_changed(channel_id, event);
                None
            }
            ChannelEventKind::BridgeEntered => self.on_bridge_entered(channel_id),
            ChannelEventKind::Terminated => {
                if self.channels.shift_remove(channel_id).is_some() {
                    debug!(channel_id = %channel_id, remaining = self.channels.len(), "Channel removed");
                }
                None
            }
        }
    }

    fn on_created(&mut self, channel_id: &str, event: &AmiEvent) {
        if self.channels.contains_key(channel_id) {
            debug!(channel_id = %channel_id, "Duplicate Newchannel ignored");
            return;
        }

        let channel_name = event.field("Channel");
        let mut channel = CallChannel::new(
            channel_id,
            event.field("Linkedid"),
            channel_name,
            self.classifier.is_internal(channel_name),
        );
        channel.set_caller_if_unset(event.field("CallerIDNum"), event.field("CallerIDName"));

        debug!(
            channel_id = %channel_id,
            channel = %channel.channel_name,
            linked_id = %channel.linked_id,
            internal = channel.is_internal,
            "Channel created"
        );
        self.channels.insert(channel_id.to_string(), channel);
    }

    fn on_state_changed(&mut self, channel_id: &str, event: &AmiEvent) {
        let Some(channel) = self.channels.get_mut(channel_id) else {
            return;
        };
        if event.field("ChannelStateDesc") == "Up" && !channel.is_up {
            channel.is_up = true;
            debug!(channel_id = %channel_id, "Channel answered");
        }
    }

    fn on_bridge_entered(&mut self, channel_id: &str) -> Option<CallBridged> {
        let channel = self.channels.get_mut(channel_id)?;
        if !channel.popup_sent {
            channel.is_bridge_candidate = true;
        }
        let internal = channel.is_internal;
        debug!(channel_id = %channel_id, internal, "Channel entered bridge");

        if internal {
            correlator::correlate_internal(&mut self.channels, channel_id)
        } else {
            correlator::correlate_external(&mut self.channels, channel_id)
        }
    }

    /// Looks up a live channel.
    pub fn get(&self, channel_id: &str) -> Option<&CallChannel> {
        self.channels.get(channel_id)
    }

    /// Live channels in creation order.
    pub fn channels(&self) -> impl Iterator<Item = &CallChannel> {
        self.channels.values()
    }

    /// Number of live channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when no channel is live.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Forgets every channel, e.g. after the upstream connection was lost.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

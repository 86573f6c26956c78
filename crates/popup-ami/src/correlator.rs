//! Bridge correlation: decides when an internal/external pair is complete.
//!
//! Pure functions over the tracker's channel table. The table preserves
//! creation order, so "first match" is deterministic.

use indexmap::IndexMap;

use popup_core::events::CallBridged;

use crate::tracker::CallChannel;

/// Live channels keyed by channel id, in creation order.
pub type ChannelTable = IndexMap<String, CallChannel>;

/// Called when an internal channel has just become a bridge candidate.
///
/// Looks for the first external channel sharing its linked id. On a match
/// the internal channel's candidate flag is consumed and exactly one
/// notification is returned. Without a match nothing changes, leaving the
/// flag set for a later retry.
pub fn correlate_internal(channels: &mut ChannelTable, internal_id: &str) -> Option<CallBridged> {
    let internal = channels.get(internal_id)?;
    if !internal.is_internal {
        return None;
    }

    let external = channels.values().find(|ch| {
        ch.channel_id != internal.channel_id && ch.linked_id == internal.linked_id && !ch.is_internal
    })?;

    let external_caller_id = external.caller_number.clone();
    let external_caller_name = external.caller_name.clone();
    let linked_id = external.linked_id.clone();

    let internal = channels.get_mut(internal_id)?;
    if !internal.is_bridge_candidate {
        return None;
    }
    internal.is_bridge_candidate = false;
    internal.popup_sent = true;

    Some(CallBridged {
        internal_channel: internal.channel_name.clone(),
        external_caller_id,
        external_caller_name,
        linked_id,
    })
}

/// Called when an external channel enters a bridge.
///
/// Retries the search for an internal channel of the same call that
/// bridged earlier, before this external leg existed or was visible.
pub fn correlate_external(channels: &mut ChannelTable, external_id: &str) -> Option<CallBridged> {
    let external = channels.get(external_id)?;
    if external.is_internal {
        return None;
    }

    let pending = channels
        .values()
        .find(|ch| {
            ch.channel_id != external.channel_id
                && ch.linked_id == external.linked_id
                && ch.is_internal
                && ch.is_bridge_candidate
        })?
        .channel_id
        .clone();

    correlate_internal(channels, &pending)
}

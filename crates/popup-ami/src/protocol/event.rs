//! Event decoder: turns a raw frame into a field mapping.

use indexmap::IndexMap;

use crate::error::{AmiError, AmiResult};

use super::codec::RawFrame;

/// Event kinds the channel tracker acts on. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEventKind {
    /// A channel was created (`Newchannel`).
    Created,
    /// A channel changed state (`Newstate`).
    StateChanged,
    /// A channel entered a bridge (`BridgeEnter`).
    BridgeEntered,
    /// A channel was torn down (`Hangup`).
    Terminated,
}

impl ChannelEventKind {
    /// Maps the `Event` field value; unknown kinds yield `None`.
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "Newchannel" => Some(Self::Created),
            "Newstate" => Some(Self::StateChanged),
            "BridgeEnter" => Some(Self::BridgeEntered),
            "Hangup" => Some(Self::Terminated),
            _ => None,
        }
    }
}

/// One decoded protocol message (event or response).
///
/// Field names are case-sensitive and keep arrival order; a repeated key
/// overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmiEvent {
    fields: IndexMap<String, String>,
}

impl AmiEvent {
    /// Decodes a frame. Lines without a `:` are skipped; the first `:`
    /// splits key from value and both sides are trimmed.
    ///
    /// A frame that yields no fields is a [`AmiError::Framing`] error.
    pub fn from_frame(frame: &RawFrame) -> AmiResult<Self> {
        let mut fields = IndexMap::new();
        for line in frame.lines() {
            if let Some((key, value)) = line.split_once(':') {
                fields.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        if fields.is_empty() {
            return Err(AmiError::Framing { raw: frame.raw() });
        }
        Ok(Self { fields })
    }

    /// Builds an event from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Looks up a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Looks up a field, defaulting to the empty string.
    pub fn field(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// The `Event` field, if this is an event rather than a response.
    pub fn event_name(&self) -> Option<&str> {
        self.get("Event").filter(|name| !name.is_empty())
    }

    /// The tracked kind of this event, if any.
    pub fn channel_kind(&self) -> Option<ChannelEventKind> {
        self.event_name().and_then(ChannelEventKind::from_event_name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines: &[&str]) -> RawFrame {
        RawFrame::new(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_fields_are_trimmed_and_split_on_first_colon() {
        let event = AmiEvent::from_frame(&frame(&[
            "Event: Newchannel",
            "  Channel :  SIP/101-000001  ",
            "Context: from-internal:extra",
        ]))
        .expect("decode");

        assert_eq!(event.get("Channel"), Some("SIP/101-000001"));
        assert_eq!(event.get("Context"), Some("from-internal:extra"));
        assert_eq!(event.channel_kind(), Some(ChannelEventKind::Created));
    }

    #[test]
    fn test_lines_without_separator_are_ignored() {
        let event = AmiEvent::from_frame(&frame(&["garbage", "Event: Hangup", "   "]))
            .expect("decode");
        assert_eq!(event.len(), 1);
    }

    #[test]
    fn test_keys_are_case_sensitive_and_duplicates_overwrite() {
        let event = AmiEvent::from_frame(&frame(&[
            "Uniqueid: first",
            "uniqueid: lower",
            "Uniqueid: second",
        ]))
        .expect("decode");

        assert_eq!(event.get("Uniqueid"), Some("second"));
        assert_eq!(event.get("uniqueid"), Some("lower"));
        let keys: Vec<&str> = event.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Uniqueid", "uniqueid"]);
    }

    #[test]
    fn test_empty_frame_is_framing_error() {
        let err = AmiEvent::from_frame(&frame(&[])).expect_err("empty");
        assert!(matches!(err, AmiError::Framing { .. }));

        let err = AmiEvent::from_frame(&frame(&["no separator here"])).expect_err("no fields");
        match err {
            AmiError::Framing { raw } => assert_eq!(raw, "no separator here"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_kind_is_not_tracked() {
        let event = AmiEvent::from_pairs([("Event", "VarSet"), ("Uniqueid", "1")]);
        assert_eq!(event.event_name(), Some("VarSet"));
        assert_eq!(event.channel_kind(), None);

        let response = AmiEvent::from_pairs([("Response", "Success")]);
        assert_eq!(response.event_name(), None);
    }
}

//! Manager-protocol wire handling: framing, event decoding, and actions.
//!
//! The protocol is line oriented. Each line is `Key: Value` terminated by
//! `\r\n`; a blank line ends a frame. The server greets with a single
//! banner line before the first frame.

pub mod action;
pub mod codec;
pub mod event;

pub use action::AmiAction;
pub use codec::{AmiCodec, RawFrame};
pub use event::{AmiEvent, ChannelEventKind};

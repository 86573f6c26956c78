//! Frame reader: splits the byte stream into blank-line-terminated frames.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::error::AmiError;

use super::action::AmiAction;

/// Upper bound on buffered bytes while waiting for a frame terminator.
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// One frame's lines, terminators stripped, in arrival order.
///
/// Carries no semantic knowledge; see [`super::event::AmiEvent`] for the
/// field mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame {
    lines: Vec<String>,
}

impl RawFrame {
    /// Builds a frame from already-split lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The frame's lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True when the frame had no lines at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The frame as text, for diagnostics.
    pub fn raw(&self) -> String {
        self.lines.join("\n")
    }
}

/// `tokio_util` codec for the manager protocol.
///
/// Decodes [`RawFrame`]s and encodes [`AmiAction`]s. When built with
/// [`AmiCodec::with_banner`], the first line of the stream is stored as
/// the server banner instead of being treated as frame content.
#[derive(Debug)]
pub struct AmiCodec {
    banner_pending: bool,
    banner: Option<String>,
    max_frame_len: usize,
}

impl AmiCodec {
    /// Codec for a stream that starts directly with frames.
    pub fn new() -> Self {
        Self {
            banner_pending: false,
            banner: None,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    /// Codec for a fresh manager connection, which opens with a banner line.
    pub fn with_banner() -> Self {
        Self {
            banner_pending: true,
            ..Self::new()
        }
    }

    /// Overrides the buffered-bytes limit.
    pub fn max_frame_len(mut self, limit: usize) -> Self {
        self.max_frame_len = limit;
        self
    }

    /// The banner line, once it has been read.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }
}

impl Default for AmiCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Strips `\n` / `\r\n` and decodes lossily.
fn decode_line(bytes: &[u8]) -> String {
    let mut end = bytes.len();
    if end > 0 && bytes[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && bytes[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

impl Decoder for AmiCodec {
    type Item = RawFrame;
    type Error = AmiError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>, AmiError> {
        if self.banner_pending {
            let Some(pos) = src.iter().position(|b| *b == b'\n') else {
                return self.check_limit(src);
            };
            let line = src.split_to(pos + 1);
            let banner = decode_line(&line);
            debug!(banner = %banner, "Received manager banner");
            self.banner = Some(banner);
            self.banner_pending = false;
        }

        let mut consumed = 0;
        let mut lines = Vec::new();
        while let Some(rel) = src[consumed..].iter().position(|b| *b == b'\n') {
            let end = consumed + rel + 1;
            let line = decode_line(&src[consumed..end]);
            consumed = end;
            if line.is_empty() {
                src.advance(consumed);
                trace!(lines = lines.len(), "Decoded frame");
                return Ok(Some(RawFrame::new(lines)));
            }
            lines.push(line);
        }

        self.check_limit(src)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>, AmiError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            debug!(bytes = src.len(), "Discarding partial frame at end of stream");
            src.clear();
        }
        Ok(None)
    }
}

impl AmiCodec {
    fn check_limit(&self, src: &BytesMut) -> Result<Option<RawFrame>, AmiError> {
        if src.len() > self.max_frame_len {
            return Err(AmiError::FrameTooLarge {
                limit: self.max_frame_len,
            });
        }
        Ok(None)
    }
}

impl Encoder<AmiAction> for AmiCodec {
    type Error = AmiError;

    fn encode(&mut self, action: AmiAction, dst: &mut BytesMut) -> Result<(), AmiError> {
        for (key, value) in action.fields() {
            dst.reserve(key.len() + value.len() + 4);
            dst.put_slice(key.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

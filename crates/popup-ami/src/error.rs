//! Manager-protocol error taxonomy.

use std::time::Duration;

use thiserror::Error;

use popup_core::error::{AppError, ErrorKind};

/// Result alias for manager-protocol operations.
pub type AmiResult<T> = Result<T, AmiError>;

/// Failures raised while talking to the call-control server.
///
/// Unknown channels and unknown event kinds are not errors; the tracker
/// ignores them silently.
#[derive(Debug, Error)]
pub enum AmiError {
    /// A frame carried no `Key: Value` fields. The frame is discarded and
    /// the stream stays usable.
    #[error("malformed frame: {raw:?}")]
    Framing {
        /// The frame as received, lines joined with `\n`.
        raw: String,
    },

    /// Buffered bytes grew past the limit without a frame terminator.
    #[error("frame exceeds {limit} bytes without a terminator")]
    FrameTooLarge {
        /// The configured limit.
        limit: usize,
    },

    /// The server closed the connection, mid-frame or between frames.
    #[error("manager connection closed")]
    StreamClosed,

    /// The login response was not `Success`.
    #[error("login rejected: response={response:?} message={message:?}")]
    AuthFailure {
        /// Value of the `Response` field.
        response: String,
        /// Value of the `Message` field.
        message: String,
    },

    /// Nothing arrived within the configured liveness window.
    #[error("no data from manager for {0:?}")]
    Timeout(Duration),

    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AmiError {
    /// Errors that must stop the pipeline instead of reconnecting.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AuthFailure { .. })
    }

    /// Errors after which the current frame is dropped but the stream is kept.
    pub fn is_recoverable_in_session(&self) -> bool {
        matches!(self, Self::Framing { .. })
    }
}

impl From<AmiError> for AppError {
    fn from(err: AmiError) -> Self {
        let kind = match &err {
            AmiError::AuthFailure { .. } => ErrorKind::Authentication,
            AmiError::Io(_) => ErrorKind::Io,
            _ => ErrorKind::ExternalService,
        };
        AppError::with_source(kind, err.to_string(), err)
    }
}

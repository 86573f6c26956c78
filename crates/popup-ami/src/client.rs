//! Manager-protocol client: connect, login, read events, logoff.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use popup_core::config::ami::AmiConfig;

use crate::error::{AmiError, AmiResult};
use crate::protocol::{AmiAction, AmiCodec, AmiEvent, RawFrame};

/// A connection to the manager interface.
///
/// Generic over the transport so tests can drive it with an in-memory
/// duplex stream.
pub struct AmiClient<S> {
    framed: Framed<S, AmiCodec>,
    read_timeout: Option<Duration>,
}

impl<S> std::fmt::Debug for AmiClient<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmiClient")
            .field("banner", &self.framed.codec().banner())
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl AmiClient<TcpStream> {
    /// Opens a TCP connection to `config.host`.
    pub async fn connect(config: &AmiConfig) -> AmiResult<Self> {
        info!(host = %config.host, "Connecting to manager interface");
        let stream = TcpStream::connect(&config.host).await?;
        stream.set_nodelay(true)?;

        let read_timeout = match config.read_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(Self::new(stream).with_read_timeout(read_timeout))
    }
}

impl<S> AmiClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a fresh transport; the first line read is the server banner.
    pub fn new(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, AmiCodec::with_banner()),
            read_timeout: None,
        }
    }

    /// Bounds every read; `None` waits forever.
    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// The server banner, once received.
    pub fn banner(&self) -> Option<&str> {
        self.framed.codec().banner()
    }

    /// Sends one action.
    pub async fn send(&mut self, action: AmiAction) -> AmiResult<()> {
        debug!(action = %action.name(), "Sending manager action");
        self.framed.send(action).await
    }

    /// Performs the login exchange.
    ///
    /// The next frame after the request is taken as the response; anything
    /// other than `Response: Success` is an [`AmiError::AuthFailure`].
    pub async fn login(&mut self, username: &str, secret: &str) -> AmiResult<()> {
        self.send(AmiAction::login(username, secret)).await?;

        let frame = self.next_frame().await?;
        let response = AmiEvent::from_frame(&frame)?;

        if response.get("Response") == Some("Success") {
            info!(
                username = %username,
                banner = self.banner().unwrap_or(""),
                "Logged in to manager interface"
            );
            return Ok(());
        }

        Err(AmiError::AuthFailure {
            response: response.field("Response").to_string(),
            message: response.field("Message").to_string(),
        })
    }

    /// Reads and decodes the next frame.
    ///
    /// A frame without fields yields [`AmiError::Framing`]; the stream stays
    /// usable and the caller may keep reading.
    pub async fn next_event(&mut self) -> AmiResult<AmiEvent> {
        let frame = self.next_frame().await?;
        AmiEvent::from_frame(&frame)
    }

    /// Sends `Action: Logoff` and closes the write half, ignoring failures.
    pub async fn logoff(&mut self) {
        if let Err(e) = self.send(AmiAction::logoff()).await {
            warn!(error = %e, "Failed to send logoff");
        }
        if let Err(e) = SinkExt::<AmiAction>::close(&mut self.framed).await {
            debug!(error = %e, "Failed to close manager connection");
        }
    }

    async fn next_frame(&mut self) -> AmiResult<RawFrame> {
        let next = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.framed.next())
                .await
                .map_err(|_| AmiError::Timeout(limit))?,
            None => self.framed.next().await,
        };

        match next {
            Some(frame) => frame,
            None => Err(AmiError::StreamClosed),
        }
    }
}

//! Connection lifecycle: establish, handshake, request/response, teardown.

use crate::command::Command;
use crate::error::{Error, Result};
use crate::line::{read_line, LineDecoder};
use crate::response::Response;
use crate::runtime::AsyncStream;
use tracing::{debug, warn};

/// Result of the `sync` handshake performed after connecting.
///
/// The handshake is advisory: every variant leaves the connection open.
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake {
    /// The server answered `modeok`
    Confirmed,
    /// The server answered something else
    Unexpected(String),
    /// The exchange failed at the transport level
    Interrupted(Error),
}

impl Handshake {
    /// Whether the server answered with the expected `modeok`.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Handshake::Confirmed)
    }
}

/// An open stream to the chat server together with its line decoder.
pub struct Connection<S: AsyncStream> {
    stream: S,
    decoder: LineDecoder,
}

impl<S: AsyncStream> Connection<S> {
    /// Dial `host:port`.
    pub async fn open(host: &str, port: u16) -> Result<Self> {
        let stream = S::connect(host, port)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to {host}:{port}: {e}")))?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap a stream that is already connected.
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream,
            decoder: LineDecoder::new(),
        }
    }

    /// Send `sync` and check for `modeok`.
    ///
    /// Never fails: anything other than `modeok` is logged and reported
    /// through the returned [`Handshake`].
    pub async fn handshake(&mut self) -> Handshake {
        match self.request(&Command::Sync).await {
            Ok(line) if line == "modeok" => Handshake::Confirmed,
            Ok(line) => {
                warn!(response = %line, "unexpected handshake response");
                Handshake::Unexpected(line)
            }
            Err(e) => {
                warn!(error = %e, "handshake failed");
                Handshake::Interrupted(e)
            }
        }
    }

    /// Send a command and read exactly one response line.
    pub async fn request(&mut self, command: &Command) -> Result<String> {
        self.send(command).await?;
        self.read_line().await
    }

    /// Send a command and parse the single response line.
    pub async fn exchange(&mut self, command: &Command) -> Result<Response> {
        let line = self.request(command).await?;
        Ok(Response::parse(&line))
    }

    /// Encode and write one command line.
    pub async fn send(&mut self, command: &Command) -> Result<()> {
        let request = command.encode()?;
        debug!(command = command.name(), bytes = request.len(), "sending request");

        self.stream
            .write_all(&request)
            .await
            .map_err(|e| Error::Io(format!("Failed to send command: {e}")))
    }

    /// Read one response line.
    pub async fn read_line(&mut self) -> Result<String> {
        let line = read_line(&mut self.stream, &mut self.decoder).await?;
        debug!(response = %line, "received line");
        Ok(line)
    }

    /// Shut down the stream.
    pub async fn close(mut self) -> Result<()> {
        self.stream
            .shutdown()
            .await
            .map_err(|e| Error::Connection(format!("Failed to shutdown connection: {e}")))
    }
}

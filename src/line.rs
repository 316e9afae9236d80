//! Line reader for the newline-delimited protocol.
//!
//! [`LineDecoder`] is the sans-io half: it accumulates bytes one at a time and
//! yields a line whenever a `\n` arrives. [`read_line`] drives it from an
//! [`AsyncStream`], one byte per read, so nothing past the terminator is ever
//! consumed from the connection.

use crate::error::{Error, Result};
use crate::runtime::AsyncStream;
use bytes::{BufMut, BytesMut};
use tracing::trace;

/// Accumulates bytes into protocol lines.
///
/// `\r` bytes are dropped wherever they appear; only `\n` terminates a line.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
}

impl LineDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte received from the server.
    ///
    /// Returns the completed line, without its terminator, when `byte` is
    /// `\n`; otherwise `None`.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'\n' => {
                let line = self.buffer.split();
                Some(decode_text(&line))
            }
            b'\r' => None,
            other => {
                self.buffer.put_u8(other);
                None
            }
        }
    }

    /// Number of bytes buffered for the line in progress.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any partially received line.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Read one line from `stream`.
///
/// Suspends until a `\n` arrives. A read error or a zero-byte read fails the
/// whole line; the partial text is discarded since the protocol has no way
/// to resume it.
pub async fn read_line<S: AsyncStream>(stream: &mut S, decoder: &mut LineDecoder) -> Result<String> {
    loop {
        let byte = match stream.read_byte().await {
            Ok(Some(byte)) => byte,
            Ok(None) => {
                trace!(pending = decoder.pending(), "peer closed mid-line");
                decoder.clear();
                return Err(Error::ConnectionClosed);
            }
            Err(e) => {
                decoder.clear();
                return Err(Error::Io(format!("Failed to read response: {e}")));
            }
        };

        if let Some(line) = decoder.push(byte) {
            return Ok(line);
        }
    }
}

/// Decode line bytes as UTF-8, falling back to Windows-1252 for servers that
/// send legacy 8-bit text.
fn decode_text(data: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(data) {
        return text.to_string();
    }

    let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(data);
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServer;

    fn decode_all(decoder: &mut LineDecoder, data: &[u8]) -> Vec<String> {
        data.iter().filter_map(|b| decoder.push(*b)).collect()
    }

    #[test]
    fn test_single_line() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decode_all(&mut decoder, b"modeok\n"), vec!["modeok"]);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_carriage_returns_dropped_anywhere() {
        let mut decoder = LineDecoder::new();
        let lines = decode_all(&mut decoder, b"\rlog\rinok\r\n");
        assert_eq!(lines, vec!["loginok"]);
    }

    #[test]
    fn test_carriage_return_does_not_terminate() {
        let mut decoder = LineDecoder::new();
        assert!(decode_all(&mut decoder, b"users alice\r").is_empty());
        assert_eq!(decoder.pending(), "users alice".len());
        assert_eq!(decode_all(&mut decoder, b" bob\n"), vec!["users alice bob"]);
    }

    #[test]
    fn test_empty_line() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decode_all(&mut decoder, b"\r\n"), vec![""]);
    }

    #[test]
    fn test_consecutive_lines() {
        let mut decoder = LineDecoder::new();
        let lines = decode_all(&mut decoder, b"inbox 1\nmsg alice hi there\n");
        assert_eq!(lines, vec!["inbox 1", "msg alice hi there"]);
    }

    #[test]
    fn test_latin1_fallback() {
        let mut decoder = LineDecoder::new();
        let lines = decode_all(&mut decoder, b"msg \xe6\xf8\xe5\n");
        assert_eq!(lines, vec!["msg æøå"]);
    }

    #[tokio::test]
    async fn test_read_line_stops_at_terminator() {
        let (mut stream, handle) = MockServer::new()
            .greeting(b"users alice bob\nleftover\n")
            .into_stream();
        let mut decoder = LineDecoder::new();

        let line = read_line(&mut stream, &mut decoder).await.unwrap();
        assert_eq!(line, "users alice bob");
        assert_eq!(handle.unread(), "leftover\n".len());
    }

    #[tokio::test]
    async fn test_read_line_peer_close_is_failure() {
        let (mut stream, _handle) = MockServer::new().greeting(b"partial").into_stream();
        let mut decoder = LineDecoder::new();

        let result = read_line(&mut stream, &mut decoder).await;
        assert_eq!(result, Err(Error::ConnectionClosed));
        assert_eq!(decoder.pending(), 0);
    }

    #[tokio::test]
    async fn test_read_line_stream_error() {
        let (mut stream, _handle) = MockServer::new().fail_reads().into_stream();
        let mut decoder = LineDecoder::new();

        let result = read_line(&mut stream, &mut decoder).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

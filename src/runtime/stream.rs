//! Stream abstraction layer for async runtime integration.
//!
//! The [`AsyncStream`] trait is the byte-oriented duplex transport the
//! protocol engine is written against. A feature-gated newtype wraps the
//! tokio TCP stream, and [`crate::mock::MockStream`] provides a scripted
//! implementation for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "tokio-runtime")]
//! # {
//! use chat_rs::runtime::stream::{AsyncStream, TokioStream};
//!
//! # #[tokio::main]
//! # async fn main() -> std::io::Result<()> {
//! let mut stream = TokioStream::connect("chat.example.com", 1300).await?;
//! stream.write_all(b"sync \n").await?;
//! let byte = stream.read_byte().await?;
//! # Ok(())
//! # }
//! # }
//! ```

use async_trait::async_trait;

/// A unified trait for async byte streams.
///
/// Implementations must be `Send + Unpin + 'static` so a session can be moved
/// between tasks.
#[async_trait]
pub trait AsyncStream: Send + Unpin + 'static {
    /// Establishes a connection to `host:port`.
    async fn connect(host: &str, port: u16) -> std::io::Result<Self>
    where
        Self: Sized;

    /// Reads data from the stream into the provided buffer.
    ///
    /// Returns `Ok(0)` when the peer has closed its side.
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Reads exactly one byte, or `None` if the peer has closed its side.
    async fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte).await? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Writes all data from the buffer to the stream.
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Shuts down the stream.
    async fn shutdown(&mut self) -> std::io::Result<()>;
}

/// A newtype wrapper around `tokio::net::TcpStream`.
#[cfg(feature = "tokio-runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio-runtime")))]
pub struct TokioStream(pub tokio::net::TcpStream);

#[cfg(feature = "tokio-runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio-runtime")))]
#[async_trait]
impl AsyncStream for TokioStream {
    async fn connect(host: &str, port: u16) -> std::io::Result<Self>
    where
        Self: Sized,
    {
        let stream = tokio::net::TcpStream::connect((host, port)).await?;
        Ok(TokioStream(stream))
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.0.read(buf).await
    }

    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        tokio::io::AsyncWriteExt::write_all(&mut self.0, buf).await
    }

    async fn shutdown(&mut self) -> std::io::Result<()> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.0).await
    }
}

//! Async runtime integrations for chat-rs.
//!
//! The [`stream`] submodule provides the [`AsyncStream`] trait which abstracts
//! over the transport a [`Session`](crate::Session) talks through. The
//! [`tokio`] submodule provides a pre-configured session type for the Tokio
//! runtime.

pub mod stream;

pub use stream::AsyncStream;

#[cfg(feature = "tokio-runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio-runtime")))]
pub use stream::TokioStream;

#[cfg(feature = "tokio-runtime")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio-runtime")))]
pub mod tokio;

//! Tokio runtime integration for chat-rs.
//!
//! # Example
//!
//! ```no_run
//! use chat_rs::runtime::tokio::ChatSession;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = ChatSession::new();
//!     session.connect("chat.example.com", 1300).await?;
//!     session.login("alice").await?;
//!     println!("Online: {:?}", session.users().await?);
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```

/// Chat session over a Tokio TCP stream.
///
/// See [`crate::session::Session`] for the available operations.
pub type ChatSession = crate::session::Session<crate::runtime::stream::TokioStream>;

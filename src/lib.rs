//! # chat-rs
//!
//! A client library for a small newline-delimited text chat protocol.
//!
//! A client connects, performs an advisory `sync`/`modeok` handshake, may log
//! in, and then exchanges one request line for one response line: public and
//! private messages, the user list, the inbox, and jokes.
//!
//! ## Layers
//!
//! - **Encoding**: [`Command`] turns a request into its wire line
//! - **Line reading**: [`line`] splits the byte stream into lines, dropping `\r`
//! - **Connection**: [`connection::Connection`] owns the stream and runs the handshake
//! - **Session**: [`Session`] tracks the connection/authorization state and
//!   runs the protocol operations, refusing any that are illegal in the
//!   current state
//! - **Menu**: [`actions`] holds the catalog of user actions and the loop
//!   that drives a session interactively
//!
//! Transport is abstracted by [`runtime::AsyncStream`], implemented for Tokio
//! TCP streams and for the scripted [`mock::MockStream`].
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "tokio-runtime")]
//! # {
//! use chat_rs::runtime::tokio::ChatSession;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ChatSession::new();
//! session.connect("chat.example.com", 1300).await?;
//! session.login("alice").await?;
//! let delivery = session.private_message("bob", "lunch?").await?;
//! println!("delivered to {} user(s)", delivery.recipients);
//! for message in session.inbox().await? {
//!     println!("{message}");
//! }
//! session.disconnect().await?;
//! # Ok(())
//! # }
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod actions;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod line;
pub mod response;
pub mod runtime;
pub mod session;

// Mock server for testing
pub mod mock;

pub use actions::{Action, Console, Menu};
pub use command::Command;
pub use connection::Handshake;
pub use error::{Error, Result};
pub use response::{Delivery, InboxMessage, Response};
pub use session::{Session, SessionState};

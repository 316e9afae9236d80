//! Error types for the chat client library.

use crate::session::SessionState;
use std::fmt;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur when talking to a chat server.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// I/O error while sending a request or receiving a response
    Io(String),

    /// Connection could not be established or closed
    Connection(String),

    /// The peer closed the stream before a full line arrived
    ConnectionClosed,

    /// Response line does not match the grammar expected for the command
    InvalidResponse(String),

    /// The server explicitly refused the request (`loginerr`, `msgerr`)
    Rejected {
        /// Command the server refused
        command: &'static str,
        /// Reason text sent after the error token
        reason: String,
    },

    /// The operation is not available in the session's current state
    IllegalState {
        /// Operation that was attempted
        action: &'static str,
        /// State the session was in
        state: SessionState,
    },

    /// Invalid command or parameters
    InvalidCommand(String),
}

impl Error {
    /// Whether this is a low-level transport failure rather than a
    /// protocol or application level one.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Connection(_) | Error::ConnectionClosed
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::Connection(msg) => write!(f, "Connection error: {msg}"),
            Error::ConnectionClosed => write!(f, "Connection closed by server"),
            Error::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Error::Rejected { command, reason } => {
                if reason.is_empty() {
                    write!(f, "Server rejected {command}")
                } else {
                    write!(f, "Server rejected {command}: {reason}")
                }
            }
            Error::IllegalState { action, state } => {
                write!(f, "{action} is not allowed while {state}")
            }
            Error::InvalidCommand(msg) => write!(f, "Invalid command: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

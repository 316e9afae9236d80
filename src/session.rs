//! Session state machine and protocol operations.
//!
//! A [`Session`] owns at most one [`Connection`] and moves between
//! [`SessionState::Disconnected`], [`SessionState::Connected`] and
//! [`SessionState::Authorized`]. The connection exists exactly when the
//! session is not disconnected; the two are stored together so they cannot
//! drift apart.
//!
//! Every operation checks that the catalog lists it as legal for the current
//! state before touching the network, and a failed operation never changes
//! the state.
//!
//! # Example
//!
//! ```rust
//! use chat_rs::mock::MockServer;
//! use chat_rs::{Session, SessionState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> chat_rs::Result<()> {
//! let (stream, _handle) = MockServer::new()
//!     .expect("sync ", "modeok\n")
//!     .expect("login alice", "loginok\n")
//!     .into_stream();
//!
//! let mut session = Session::new();
//! session.attach(stream).await?;
//! session.login("alice").await?;
//! assert_eq!(session.state(), SessionState::Authorized);
//! # Ok(())
//! # }
//! ```

use crate::actions::Action;
use crate::command::Command;
use crate::connection::{Connection, Handshake};
use crate::error::{Error, Result};
use crate::response::{parse_count, Delivery, InboxMessage, ProtocolLine, Response};
use crate::runtime::AsyncStream;
use std::fmt;
use tracing::{info, warn};

/// Connection/authorization state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No connection to a chat server
    Disconnected,
    /// Connected, but not logged in
    Connected,
    /// Connected and logged in
    Authorized,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Authorized => "authorized",
        };
        f.write_str(name)
    }
}

enum Link<S: AsyncStream> {
    Disconnected,
    Connected(Connection<S>),
    Authorized {
        connection: Connection<S>,
        username: String,
    },
}

impl<S: AsyncStream> Link<S> {
    fn connection_mut(&mut self) -> Option<&mut Connection<S>> {
        match self {
            Link::Connected(connection) | Link::Authorized { connection, .. } => Some(connection),
            Link::Disconnected => None,
        }
    }

    /// Leave `Disconnected` behind and hand back the connection, if any.
    fn take(&mut self) -> Option<Connection<S>> {
        match std::mem::replace(self, Link::Disconnected) {
            Link::Connected(connection) | Link::Authorized { connection, .. } => Some(connection),
            Link::Disconnected => None,
        }
    }
}

/// A client session with a chat server.
///
/// The stream type `S` determines the transport; see
/// [`ChatSession`](crate::runtime::tokio::ChatSession) for TCP over Tokio.
pub struct Session<S: AsyncStream> {
    link: Link<S>,
}

impl<S: AsyncStream> Default for Session<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsyncStream> Session<S> {
    /// Create a disconnected session.
    pub fn new() -> Self {
        Self {
            link: Link::Disconnected,
        }
    }

    /// Current state of the session.
    pub fn state(&self) -> SessionState {
        match self.link {
            Link::Disconnected => SessionState::Disconnected,
            Link::Connected(_) => SessionState::Connected,
            Link::Authorized { .. } => SessionState::Authorized,
        }
    }

    /// Username the session is logged in as, if authorized.
    pub fn username(&self) -> Option<&str> {
        match &self.link {
            Link::Authorized { username, .. } => Some(username),
            _ => None,
        }
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        !matches!(self.link, Link::Disconnected)
    }

    /// Connect to `host:port` and perform the `sync` handshake.
    ///
    /// If the stream cannot be opened the session stays disconnected. Once it
    /// is open the session becomes connected whatever the handshake outcome.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<Handshake> {
        self.require(Action::Connect)?;
        let connection = Connection::open(host, port).await?;
        info!(host, port, "connected to chat server");
        Ok(self.establish(connection).await)
    }

    /// Take over an already-open stream and perform the `sync` handshake.
    pub async fn attach(&mut self, stream: S) -> Result<Handshake> {
        self.require(Action::Connect)?;
        Ok(self.establish(Connection::from_stream(stream)).await)
    }

    async fn establish(&mut self, mut connection: Connection<S>) -> Handshake {
        let handshake = connection.handshake().await;
        self.link = Link::Connected(connection);
        handshake
    }

    /// Close the connection.
    ///
    /// The session is disconnected afterwards even if closing the stream
    /// fails; the close error is still returned.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.require(Action::Disconnect)?;
        let connection = self
            .link
            .take()
            .ok_or_else(|| illegal(Action::Disconnect, SessionState::Disconnected))?;

        match connection.close().await {
            Ok(()) => {
                info!("disconnected from chat server");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to close connection cleanly");
                Err(e)
            }
        }
    }

    /// Log in as `username`.
    ///
    /// Only `loginok` authorizes the session.
    pub async fn login(&mut self, username: &str) -> Result<()> {
        let connection = self.connection_for(Action::Login)?;
        let response = connection
            .exchange(&Command::Login(username.to_string()))
            .await?;

        match response {
            Response::LoginOk => {
                self.authorize(username.to_string());
                info!(username, "logged in");
                Ok(())
            }
            Response::LoginErr(reason) => Err(Error::Rejected {
                command: "login",
                reason,
            }),
            other => Err(unexpected("login", &other)),
        }
    }

    fn authorize(&mut self, username: String) {
        if let Some(connection) = self.link.take() {
            self.link = Link::Authorized {
                connection,
                username,
            };
        }
    }

    /// Send a message to every user.
    pub async fn public_message(&mut self, text: &str) -> Result<()> {
        let connection = self.connection_for(Action::PublicMessage)?;
        let response = connection.exchange(&Command::Msg(text.to_string())).await?;

        match response {
            Response::MsgOk { .. } => Ok(()),
            Response::MsgErr(reason) => Err(Error::Rejected {
                command: "msg",
                reason,
            }),
            other => Err(unexpected("msg", &other)),
        }
    }

    /// Send a message to `recipient`.
    ///
    /// Succeeds whenever the server answers `msgok <count>`, including when
    /// the count is not one.
    pub async fn private_message(&mut self, recipient: &str, text: &str) -> Result<Delivery> {
        let connection = self.connection_for(Action::PrivateMessage)?;
        let command = Command::PrivMsg {
            recipient: recipient.to_string(),
            text: text.to_string(),
        };
        let response = connection.exchange(&command).await?;

        match response {
            Response::MsgOk { detail } => {
                let recipients = parse_count(detail.first().map(String::as_str), "privmsg")?;
                if recipients != 1 {
                    info!(recipients, "private message reached more than one user");
                }
                Ok(Delivery { recipients })
            }
            Response::MsgErr(reason) => Err(Error::Rejected {
                command: "privmsg",
                reason,
            }),
            other => Err(unexpected("privmsg", &other)),
        }
    }

    /// Fetch the names of users currently online.
    ///
    /// Every token after the first is taken as a username.
    pub async fn users(&mut self) -> Result<Vec<String>> {
        let connection = self.connection_for(Action::Users)?;
        let line = ProtocolLine::parse(&connection.request(&Command::Users).await?);

        if line.keyword() != "users" {
            warn!(response = %line, "user list without users keyword");
        }
        Ok(line.tokens_from(1).to_vec())
    }

    /// Fetch all messages waiting in the inbox.
    ///
    /// The header's second token is the message count. A failure on any of
    /// the reads aborts the whole fetch.
    pub async fn inbox(&mut self) -> Result<Vec<InboxMessage>> {
        let connection = self.connection_for(Action::Inbox)?;
        let header = ProtocolLine::parse(&connection.request(&Command::Inbox).await?);

        if header.keyword() != "inbox" {
            warn!(response = %header, "inbox header without inbox keyword");
        }
        let count = parse_count(header.token(1), "inbox")?;

        // The count comes from the server; grow as lines actually arrive.
        let mut lines = Vec::new();
        for _ in 0..count {
            lines.push(connection.read_line().await?);
        }

        lines.iter().map(|line| InboxMessage::parse(line)).collect()
    }

    /// Ask the server for a joke.
    pub async fn joke(&mut self) -> Result<String> {
        let connection = self.connection_for(Action::Joke)?;
        match connection.exchange(&Command::Joke).await? {
            Response::Joke(text) => Ok(text),
            other => Err(unexpected("joke", &other)),
        }
    }

    fn require(&self, action: Action) -> Result<()> {
        let state = self.state();
        if action.is_legal(state) {
            Ok(())
        } else {
            Err(illegal(action, state))
        }
    }

    fn connection_for(&mut self, action: Action) -> Result<&mut Connection<S>> {
        self.require(action)?;
        self.link
            .connection_mut()
            .ok_or_else(|| illegal(action, SessionState::Disconnected))
    }
}

fn illegal(action: Action, state: SessionState) -> Error {
    Error::IllegalState {
        action: action.command_name(),
        state,
    }
}

fn unexpected(command: &str, response: &Response) -> Error {
    match response {
        Response::Unknown(line) => {
            Error::InvalidResponse(format!("unexpected {command} response: {line}"))
        }
        other => Error::InvalidResponse(format!("unexpected {command} response: {other:?}")),
    }
}

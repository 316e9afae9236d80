//! Chat protocol commands and encoding.

use crate::error::{Error, Result};

/// Commands that can be sent to the chat server.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Advisory handshake sent right after connecting
    Sync,

    /// Log in with a username
    Login(String),

    /// Send a message to every user
    Msg(String),

    /// Send a message to a single user
    PrivMsg {
        /// Username of the recipient
        recipient: String,
        /// Message text
        text: String,
    },

    /// Request the list of users currently online
    Users,

    /// Fetch messages waiting in the inbox
    Inbox,

    /// Ask the server for a joke
    Joke,
}

impl Command {
    /// Protocol keyword of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Sync => "sync",
            Command::Login(_) => "login",
            Command::Msg(_) => "msg",
            Command::PrivMsg { .. } => "privmsg",
            Command::Users => "users",
            Command::Inbox => "inbox",
            Command::Joke => "joke",
        }
    }

    /// Argument string sent after the keyword.
    ///
    /// Composite arguments are joined with single spaces. Nothing is
    /// escaped, so text containing spaces or protocol keywords is sent as is.
    pub fn argument(&self) -> String {
        match self {
            Command::Login(username) => username.clone(),
            Command::Msg(text) => text.clone(),
            Command::PrivMsg { recipient, text } => format!("{recipient} {text}"),
            Command::Sync | Command::Users | Command::Inbox | Command::Joke => String::new(),
        }
    }

    /// Encode command as bytes for transmission to server.
    ///
    /// The line is always `<command> <argument>\n`, including the separating
    /// space when the argument is empty.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let argument = self.argument();
        validate_argument(&argument)?;

        let mut bytes = Vec::with_capacity(self.name().len() + argument.len() + 2);
        bytes.extend_from_slice(self.name().as_bytes());
        bytes.push(b' ');
        bytes.extend_from_slice(argument.as_bytes());
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// A newline inside the argument would split the request into two lines.
fn validate_argument(argument: &str) -> Result<()> {
    if argument.contains('\n') {
        return Err(Error::InvalidCommand(
            "Arguments cannot contain line breaks".to_string(),
        ));
    }
    Ok(())
}

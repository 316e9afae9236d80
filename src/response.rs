//! Chat server response types and parsing.

use crate::error::{Error, Result};
use std::fmt;

/// One protocol line split into its space-separated tokens.
///
/// Tokens are split on single spaces, so consecutive spaces produce empty
/// tokens rather than being collapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLine {
    tokens: Vec<String>,
}

impl ProtocolLine {
    /// Tokenize a line received from the server.
    pub fn parse(line: &str) -> Self {
        Self {
            tokens: line.split(' ').map(str::to_string).collect(),
        }
    }

    /// The first token, which names the response kind.
    pub fn keyword(&self) -> &str {
        self.token(0).unwrap_or_default()
    }

    /// Token at `index`, if present.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// All tokens from `index` onward.
    pub fn tokens_from(&self, index: usize) -> &[String] {
        self.tokens.get(index..).unwrap_or_default()
    }

    /// Tokens from `index` onward, joined back with single spaces.
    pub fn rest(&self, index: usize) -> String {
        self.tokens_from(index).join(" ")
    }
}

impl fmt::Display for ProtocolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Single-line replies to `login`, `msg`, `privmsg` and `joke`, classified by
/// their leading keyword.
///
/// The handshake, user list and inbox replies are read positionally from a
/// [`ProtocolLine`] instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Login accepted (`loginok`)
    LoginOk,

    /// Login refused (`loginerr <reason>`)
    LoginErr(String),

    /// Message accepted (`msgok [<count>]`)
    MsgOk {
        /// Tokens after the keyword; for `privmsg` the first is the
        /// recipient count
        detail: Vec<String>,
    },

    /// Message refused (`msgerr <reason>`)
    MsgErr(String),

    /// Joke text (`joke <text>`)
    Joke(String),

    /// Any line whose keyword is not recognized
    Unknown(ProtocolLine),
}

impl Response {
    /// Classify a single response line.
    pub fn parse(line: &str) -> Self {
        let line = ProtocolLine::parse(line);
        match line.keyword() {
            "loginok" => Response::LoginOk,
            "loginerr" => Response::LoginErr(line.rest(1)),
            "msgok" => Response::MsgOk {
                detail: line.tokens_from(1).to_vec(),
            },
            "msgerr" => Response::MsgErr(line.rest(1)),
            "joke" => Response::Joke(line.rest(1)),
            _ => Response::Unknown(line),
        }
    }
}

/// Parse a decimal, non-negative count token.
///
/// A missing or malformed token is a grammar mismatch, not a parse fault.
/// Counts compare by value, so leading zeros are accepted (`01` is one).
pub fn parse_count(token: Option<&str>, context: &str) -> Result<u32> {
    let token = token.ok_or_else(|| {
        Error::InvalidResponse(format!("{context} response is missing its count"))
    })?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidResponse(format!(
            "{context} count is not a number: {token:?}"
        )));
    }
    token
        .parse()
        .map_err(|_| Error::InvalidResponse(format!("{context} count out of range: {token}")))
}

/// One message from the inbox.
#[derive(Debug, Clone, PartialEq)]
pub struct InboxMessage {
    /// Username of the sender
    pub sender: String,
    /// Message text
    pub body: String,
}

impl InboxMessage {
    /// Parse an inbox line of the form `<kind> <sender> <word>...`.
    ///
    /// The leading token is ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let line = ProtocolLine::parse(line);
        let sender = line.token(1).ok_or_else(|| {
            Error::InvalidResponse(format!("inbox message without sender: {line}"))
        })?;
        Ok(Self {
            sender: sender.to_string(),
            body: line.rest(2),
        })
    }
}

impl fmt::Display for InboxMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.body)
    }
}

/// Outcome of an accepted private message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Number of users the server delivered the message to
    pub recipients: u32,
}

impl Delivery {
    /// Whether the message reached exactly the one intended recipient.
    pub fn is_single(&self) -> bool {
        self.recipients == 1
    }
}

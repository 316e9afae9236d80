//! The catalog of user actions and the menu loop that dispatches them.
//!
//! Each [`Action`] knows the states it is legal in. The [`Menu`] lists only
//! the legal ones, asks the user for whatever input an action needs through a
//! [`Console`], runs it against the [`Session`] and reports the outcome. A
//! failed action is never retried; the user picks again.

use crate::config::Endpoint;
use crate::connection::Handshake;
use crate::error::Error;
use crate::runtime::AsyncStream;
use crate::session::SessionState::{Authorized, Connected, Disconnected};
use crate::session::{Session, SessionState};
use async_trait::async_trait;
use std::io;
use tracing::debug;

/// An entry of the action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Connect to the configured chat server
    Connect,
    /// Close the connection
    Disconnect,
    /// Log in with a username
    Login,
    /// Send a message to everyone
    PublicMessage,
    /// Send a message to one user
    PrivateMessage,
    /// Read the messages waiting in the inbox
    Inbox,
    /// List the users online
    Users,
    /// Ask the server for a joke
    Joke,
    /// Leave the application
    Quit,
}

/// All actions, in menu order.
pub const CATALOG: [Action; 9] = [
    Action::Connect,
    Action::Disconnect,
    Action::Login,
    Action::PublicMessage,
    Action::PrivateMessage,
    Action::Inbox,
    Action::Users,
    Action::Joke,
    Action::Quit,
];

impl Action {
    /// Text shown in the menu.
    pub fn description(self) -> &'static str {
        match self {
            Action::Connect => "Connect to a chat server",
            Action::Disconnect => "Disconnect from the server",
            Action::Login => "Authorize (log in)",
            Action::PublicMessage => "Send a public message",
            Action::PrivateMessage => "Send a private message",
            Action::Inbox => "Read messages in the inbox",
            Action::Users => "See list of users",
            Action::Joke => "Get a joke",
            Action::Quit => "Quit the application",
        }
    }

    /// States in which this action may run.
    pub fn legal_states(self) -> &'static [SessionState] {
        match self {
            Action::Connect => &[Disconnected],
            Action::PrivateMessage => &[Authorized],
            Action::Quit => &[Disconnected, Connected, Authorized],
            Action::Disconnect
            | Action::Login
            | Action::PublicMessage
            | Action::Inbox
            | Action::Users
            | Action::Joke => &[Connected, Authorized],
        }
    }

    /// Whether this action may run in `state`.
    pub fn is_legal(self, state: SessionState) -> bool {
        self.legal_states().contains(&state)
    }

    /// Short name used in errors and logs.
    pub fn command_name(self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Disconnect => "disconnect",
            Action::Login => "login",
            Action::PublicMessage => "msg",
            Action::PrivateMessage => "privmsg",
            Action::Inbox => "inbox",
            Action::Users => "users",
            Action::Joke => "joke",
            Action::Quit => "quit",
        }
    }
}

/// Where the menu reads user input and writes its output.
#[async_trait]
pub trait Console: Send {
    /// Show `question` and wait for one line of input.
    ///
    /// An error (including end of input) stops the menu loop.
    async fn prompt(&mut self, question: &str) -> io::Result<String>;

    /// Show a line of output.
    fn show(&mut self, text: &str);
}

/// Interactive menu driving a [`Session`].
pub struct Menu<S: AsyncStream, C: Console> {
    session: Session<S>,
    console: C,
    endpoint: Endpoint,
    running: bool,
}

impl<S: AsyncStream, C: Console> Menu<S, C> {
    /// Create a menu for a disconnected session.
    pub fn new(console: C, endpoint: Endpoint) -> Self {
        Self::with_session(Session::new(), console, endpoint)
    }

    /// Create a menu around an existing session.
    pub fn with_session(session: Session<S>, console: C, endpoint: Endpoint) -> Self {
        Self {
            session,
            console,
            endpoint,
            running: true,
        }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// The console used for input and output.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Whether the user has not chosen to quit yet.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run until the user quits or input ends.
    pub async fn run(&mut self) {
        while self.running {
            self.render();
            let count = CATALOG.len();
            let input = match self
                .console
                .prompt(&format!("Enter the number of your choice (1..{count}):"))
                .await
            {
                Ok(input) => input,
                Err(e) => {
                    debug!(error = %e, "input closed");
                    break;
                }
            };

            match select(&input) {
                Some(action) => {
                    self.console.show("");
                    self.perform(action).await;
                }
                None => self.console.show("Invalid input, please choose a valid action"),
            }
            self.console.show("");
        }
        self.console.show("Goodbye");
    }

    /// Print the actions that are legal in the current state, numbered by
    /// their position in the catalog.
    pub fn render(&mut self) {
        let state = self.session.state();
        self.console.show("==============================================");
        self.console.show("What do you want to do now?");
        self.console.show("==============================================");
        self.console.show("Available options:");
        for (index, action) in CATALOG.iter().enumerate() {
            if action.is_legal(state) {
                self.console
                    .show(&format!("  {}) {}", index + 1, action.description()));
            }
        }
        self.console.show("");
    }

    /// Run one action if it is legal in the current state.
    ///
    /// Returns whether the action succeeded. An illegal action is refused
    /// before any input is requested or any byte is sent.
    pub async fn perform(&mut self, action: Action) -> bool {
        let state = self.session.state();
        if !action.is_legal(state) {
            self.console.show(&format!(
                "This function is not allowed in the current system state ({state})"
            ));
            return false;
        }

        match action {
            Action::Connect => self.connect().await,
            Action::Disconnect => self.disconnect().await,
            Action::Login => self.login().await,
            Action::PublicMessage => self.public_message().await,
            Action::PrivateMessage => self.private_message().await,
            Action::Inbox => self.inbox().await,
            Action::Users => self.users().await,
            Action::Joke => self.joke().await,
            Action::Quit => {
                self.running = false;
                true
            }
        }
    }

    async fn connect(&mut self) -> bool {
        let Endpoint { host, port } = self.endpoint.clone();
        match self.session.connect(&host, port).await {
            Ok(Handshake::Confirmed) => {
                self.console.show("Connected, server answered modeok");
                true
            }
            Ok(Handshake::Unexpected(line)) => {
                self.console
                    .show(&format!("Connected, but the server answered: {line}"));
                true
            }
            Ok(Handshake::Interrupted(e)) => {
                self.console
                    .show(&format!("Connected, but the handshake failed: {e}"));
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn disconnect(&mut self) -> bool {
        match self.session.disconnect().await {
            Ok(()) => {
                self.console.show("Disconnected");
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn login(&mut self) -> bool {
        let Some(username) = self.ask("Enter username: ").await else {
            return false;
        };
        match self.session.login(&username).await {
            Ok(()) => {
                self.console.show(&format!("Logged in as {username}"));
                true
            }
            Err(Error::Rejected { reason, .. }) if reason == "incorrect username format" => {
                self.console.show(
                    "Username may only contain letters and digits, please try again",
                );
                false
            }
            Err(e) => self.fail(e),
        }
    }

    async fn public_message(&mut self) -> bool {
        let Some(text) = self.ask("Write the message you wish to send: ").await else {
            return false;
        };
        match self.session.public_message(&text).await {
            Ok(()) => {
                self.console.show("Message sent");
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn private_message(&mut self) -> bool {
        let Some(recipient) = self.ask("Enter username of recipient: ").await else {
            return false;
        };
        let Some(text) = self.ask("Enter message to be sent: ").await else {
            return false;
        };
        match self.session.private_message(&recipient, &text).await {
            Ok(delivery) if delivery.is_single() => {
                self.console.show("Message sent");
                true
            }
            Ok(delivery) => {
                self.console.show(&format!(
                    "Message sent to {} recipients",
                    delivery.recipients
                ));
                true
            }
            Err(Error::Rejected { .. }) => {
                self.console
                    .show(&format!("Message not sent, invalid recipient: {recipient}"));
                false
            }
            Err(e) => self.fail(e),
        }
    }

    async fn inbox(&mut self) -> bool {
        match self.session.inbox().await {
            Ok(messages) if messages.is_empty() => {
                self.console.show("No new messages in inbox");
                true
            }
            Ok(messages) => {
                self.console
                    .show(&format!("Your inbox has {} new messages", messages.len()));
                for (i, message) in messages.iter().enumerate() {
                    self.console.show(&format!(
                        "Message {} is from {} and reads: {}",
                        i + 1,
                        message.sender,
                        message.body
                    ));
                }
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn users(&mut self) -> bool {
        match self.session.users().await {
            Ok(users) => {
                self.console.show(&format!("Users online: {}", users.join(", ")));
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn joke(&mut self) -> bool {
        match self.session.joke().await {
            Ok(joke) => {
                self.console.show(&joke);
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn ask(&mut self, question: &str) -> Option<String> {
        match self.console.prompt(question).await {
            Ok(answer) => Some(answer),
            Err(e) => {
                self.console.show(&format!("No input: {e}"));
                None
            }
        }
    }

    fn fail(&mut self, error: Error) -> bool {
        self.console.show(&format!("Error: {error}"));
        false
    }
}

/// Map the user's 1-based menu choice to a catalog entry.
pub fn select(input: &str) -> Option<Action> {
    let choice: usize = input.trim().parse().ok()?;
    CATALOG.get(choice.checked_sub(1)?).copied()
}

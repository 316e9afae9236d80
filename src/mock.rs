//! Mock chat server for testing purposes.
//!
//! [`MockServer`] scripts the conversation a client is expected to have:
//! each expected request line is paired with the raw bytes sent back. The
//! script is turned into a [`MockStream`], which implements
//! [`AsyncStream`], and a [`MockHandle`] for inspecting what the client did
//! after the stream has been handed to a session.
//!
//! [`ScriptedConsole`] plays the user's side of the menu.

use crate::actions::Console;
use crate::runtime::AsyncStream;
use async_trait::async_trait;
use bytes::BytesMut;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
struct Exchange {
    request: String,
    reply: Vec<u8>,
}

/// Builder for a scripted server conversation.
///
/// Requests are compared line by line, without the trailing `\n`. A request
/// that does not match the next expected one fails the write.
#[derive(Debug, Clone, Default)]
pub struct MockServer {
    exchanges: VecDeque<Exchange>,
    greeting: Vec<u8>,
    fail_reads: bool,
    fail_writes: bool,
    fail_close: bool,
}

impl MockServer {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `request` next and answer with the raw bytes of `reply`.
    ///
    /// The reply may hold any number of lines, or none at all.
    pub fn expect(mut self, request: impl Into<String>, reply: impl AsRef<[u8]>) -> Self {
        self.exchanges.push_back(Exchange {
            request: request.into(),
            reply: reply.as_ref().to_vec(),
        });
        self
    }

    /// Bytes readable before any request is sent.
    pub fn greeting(mut self, bytes: impl AsRef<[u8]>) -> Self {
        self.greeting.extend_from_slice(bytes.as_ref());
        self
    }

    /// Append another script after this one, keeping any failure switches
    /// set on either.
    pub fn merge(mut self, other: MockServer) -> Self {
        self.exchanges.extend(other.exchanges);
        self.greeting.extend(other.greeting);
        self.fail_reads |= other.fail_reads;
        self.fail_writes |= other.fail_writes;
        self.fail_close |= other.fail_close;
        self
    }

    /// Once all scripted bytes are read, fail reads instead of reporting
    /// end of stream.
    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Fail every write.
    pub fn fail_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Fail the shutdown of the stream.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Turn the script into a stream and a handle observing it.
    pub fn into_stream(self) -> (MockStream, MockHandle) {
        let state = Arc::new(Mutex::new(MockState {
            incoming: self.greeting.into(),
            exchanges: self.exchanges,
            outgoing: BytesMut::new(),
            sent: Vec::new(),
            bytes_written: 0,
            closed: false,
            fail_reads: self.fail_reads,
            fail_writes: self.fail_writes,
            fail_close: self.fail_close,
        }));
        (
            MockStream {
                state: Arc::clone(&state),
            },
            MockHandle { state },
        )
    }
}

#[derive(Debug)]
struct MockState {
    exchanges: VecDeque<Exchange>,
    incoming: VecDeque<u8>,
    outgoing: BytesMut,
    sent: Vec<String>,
    bytes_written: usize,
    closed: bool,
    fail_reads: bool,
    fail_writes: bool,
    fail_close: bool,
}

impl MockState {
    fn receive(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "mock stream closed"));
        }

        self.outgoing.extend_from_slice(buf);
        self.bytes_written += buf.len();

        while let Some(pos) = self.outgoing.iter().position(|b| *b == b'\n') {
            let line = self.outgoing.split_to(pos + 1);
            let request = String::from_utf8_lossy(&line[..pos]).into_owned();
            self.sent.push(request.clone());
            self.respond(&request)?;
        }
        Ok(())
    }

    fn respond(&mut self, request: &str) -> io::Result<()> {
        let Some(exchange) = self.exchanges.pop_front() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("no more expected requests, got {request:?}"),
            ));
        };

        if exchange.request != request {
            let message = format!("expected request {:?}, got {request:?}", exchange.request);
            self.exchanges.push_front(exchange);
            return Err(io::Error::new(io::ErrorKind::InvalidData, message));
        }

        self.incoming.extend(exchange.reply);
        Ok(())
    }

    fn deliver(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.incoming.is_empty() {
            if self.fail_reads {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "mock read failure",
                ));
            }
            return Ok(0);
        }

        let n = buf.len().min(self.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted in-memory stream produced by [`MockServer::into_stream`].
#[derive(Debug)]
pub struct MockStream {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl AsyncStream for MockStream {
    async fn connect(host: &str, port: u16) -> io::Result<Self>
    where
        Self: Sized,
    {
        Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("mock streams cannot dial {host}:{port}; use MockServer::into_stream"),
        ))
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        lock(&self.state).deliver(buf)
    }

    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        lock(&self.state).receive(buf)
    }

    async fn shutdown(&mut self) -> io::Result<()> {
        let mut state = lock(&self.state);
        if state.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "mock close failure"));
        }
        state.closed = true;
        Ok(())
    }
}

/// Observes a [`MockStream`] after it has been handed off.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// Complete request lines the client sent, without their `\n`.
    pub fn sent_lines(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    /// Total bytes the client wrote.
    pub fn bytes_written(&self) -> usize {
        lock(&self.state).bytes_written
    }

    /// Reply bytes not yet read by the client.
    pub fn unread(&self) -> usize {
        lock(&self.state).incoming.len()
    }

    /// Check if all expected requests have been received.
    pub fn is_complete(&self) -> bool {
        lock(&self.state).exchanges.is_empty()
    }

    /// Get the number of remaining expected requests.
    pub fn remaining_interactions(&self) -> usize {
        lock(&self.state).exchanges.len()
    }

    /// Whether the client shut the stream down successfully.
    pub fn is_closed(&self) -> bool {
        lock(&self.state).closed
    }
}

/// A [`Console`] fed from a fixed list of answers.
///
/// Once the answers run out, prompts fail with
/// [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    prompts: Vec<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    /// Create a console that answers prompts in order.
    pub fn new<I, T>(answers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Questions asked so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Lines shown so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Answers not consumed yet.
    pub fn remaining_answers(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn prompt(&mut self, question: &str) -> io::Result<String> {
        self.prompts.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no scripted answers left"))
    }

    fn show(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}

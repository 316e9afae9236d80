//! Interactive chat client.
//!
//! Presents the action menu on stdout, reads choices from stdin and logs to
//! stderr.

use async_trait::async_trait;
use chat_rs::config::{Config, FileConfig, Overrides};
use chat_rs::runtime::TokioStream;
use chat_rs::{Console, Menu};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the chat client
#[derive(Parser, Debug)]
#[command(name = "chat-client")]
#[command(version)]
#[command(about = "Interactive client for the line-based chat protocol", long_about = None)]
struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chat server hostname or IP address
    #[arg(long)]
    host: Option<String>,

    /// Chat server TCP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl CliArgs {
    fn load_config(self) -> Result<Config, Box<dyn std::error::Error>> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(file.resolve(Overrides {
            host: self.host,
            port: self.port,
            log_level: self.log_level,
        }))
    }
}

struct StdConsole {
    lines: Lines<BufReader<Stdin>>,
}

impl StdConsole {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

#[async_trait]
impl Console for StdConsole {
    async fn prompt(&mut self, question: &str) -> io::Result<String> {
        print!("{question}");
        io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")),
        }
    }

    fn show(&mut self, text: &str) {
        println!("{text}");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliArgs::parse().load_config()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    info!(
        host = %config.endpoint.host,
        port = config.endpoint.port,
        "starting chat client"
    );

    let mut menu = Menu::<TokioStream, _>::new(StdConsole::new(), config.endpoint);
    menu.run().await;
    Ok(())
}

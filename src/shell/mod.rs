//! Interactive shell
//!
//! Reads commands line by line, runs them against a [`Session`] and prints
//! the outcome. Errors are reported and, when the control connection is
//! gone, the session is reset so the user can `open` again.

pub mod commands;
pub mod handlers;
pub mod terminal;

pub use commands::{COMMAND_TABLE, ShellCommand, ShellParseError};
pub use handlers::{CommandResult, CommandStatus};

use std::io;

use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::Session;
use crate::error::handlers::handle_error;
use crate::error::Result;

/// Reads a secret without echoing it. Runs on a blocking thread.
pub type SecretReader = fn() -> io::Result<String>;

pub struct Shell<R, W> {
    session: Session,
    input: R,
    output: W,
    secret_reader: Option<SecretReader>,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: Session, input: R, output: W) -> Self {
        Self {
            session,
            input,
            output,
            secret_reader: None,
        }
    }

    /// Reads passwords through `reader` instead of the input stream.
    pub fn with_secret_reader(mut self, reader: SecretReader) -> Self {
        self.secret_reader = Some(reader);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `bye` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let prompt = self.session.config().prompt.clone();
            let Some(line) = self.read_line(&prompt).await? else {
                info!("Input closed");
                if self.session.is_connected() {
                    let _ = self.execute(ShellCommand::Bye).await;
                }
                return Ok(());
            };

            if line.trim().is_empty() {
                continue;
            }

            let command = match ShellCommand::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    self.print(&format!("{}\ninvalid command", e)).await?;
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(result) => {
                    if let Some(message) = result.message {
                        self.print(&message).await?;
                    }
                    if result.status == CommandStatus::Exit {
                        return Ok(());
                    }
                }
                Err(err) => {
                    self.print(&err.to_string()).await?;
                    if !handle_error(&err) {
                        self.session.reset();
                        self.print("connection lost, session reset").await?;
                    }
                }
            }
        }
    }

    async fn print(&mut self, message: &str) -> Result<()> {
        self.output.write_all(message.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Shows `prompt` and reads one line, `None` at end of input.
    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Reads a credential; end of input counts as empty.
    async fn prompt(&mut self, prompt: &str) -> Result<String> {
        Ok(self.read_line(prompt).await?.unwrap_or_default())
    }

    /// Like [`prompt`](Self::prompt), but hidden when a secret reader is set.
    async fn prompt_secret(&mut self, prompt: &str) -> Result<String> {
        let Some(reader) = self.secret_reader else {
            return self.prompt(prompt).await;
        };

        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        let secret = tokio::task::spawn_blocking(reader)
            .await
            .map_err(io::Error::other)??;
        self.print("").await?;
        Ok(secret)
    }
}

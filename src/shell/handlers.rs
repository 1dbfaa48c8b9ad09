//! Command handlers for the interactive shell.
//!
//! `execute` maps every [`ShellCommand`] variant to exactly one handler. Each
//! handler drives the session and returns the text to show the user.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::error::{Result, SessionError};
use crate::shell::Shell;
use crate::shell::commands::{COMMAND_TABLE, ShellCommand};
use crate::transfer::TransferMode;

/// Whether the shell keeps reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Continue,
    Exit,
}

/// Outcome of one shell command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

impl CommandResult {
    fn show(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Continue,
            message: Some(message.into()),
        }
    }

    fn exit(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Exit,
            message: Some(message.into()),
        }
    }
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Dispatches a parsed command to its handler.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<CommandResult> {
        match command {
            ShellCommand::Open { host, port } => self.handle_open(&host, port).await,
            ShellCommand::Close => self.handle_close().await,
            ShellCommand::Bye => self.handle_bye().await,
            ShellCommand::Recv(path) => self.handle_recv(&path).await,
            ShellCommand::Send(path) => self.handle_send(&path).await,
            ShellCommand::Ls(path) => self.handle_list(path.as_deref(), false).await,
            ShellCommand::Nlist(path) => self.handle_list(path.as_deref(), true).await,
            ShellCommand::Mkdir(path) => self.handle_mkdir(&path).await,
            ShellCommand::Rm(path) => self.handle_rm(&path).await,
            ShellCommand::Cd(path) => self.handle_cd(&path).await,
            ShellCommand::Resume(path) => self.handle_resume(&path).await,
            ShellCommand::Pasv => Ok(self.handle_mode(TransferMode::Passive)),
            ShellCommand::Port => Ok(self.handle_mode(TransferMode::Active)),
            ShellCommand::Mult => self.handle_mult().await,
            ShellCommand::Encry => self.handle_encry().await,
            ShellCommand::Help => Ok(handle_help()),
        }
    }

    /// Connects, prompts for credentials, logs in and switches to binary.
    async fn handle_open(&mut self, host: &str, port: Option<u16>) -> Result<CommandResult> {
        if self.session.state().is_logged_in() {
            return Err(SessionError::AlreadyConnected.into());
        }

        let port = port.unwrap_or(self.session.config().default_port);
        let greeting = self.session.connect(host, port).await?;
        self.print(&greeting.text).await?;

        let username = self.prompt("username: ").await?;
        let password = self.prompt_secret("password: ").await?;
        let login = self.session.login(&username, &password).await?;

        let mut lines = vec![format!("login successful as {}", login.username)];
        if login.binary {
            lines.push("using binary.".to_string());
        } else {
            lines.push("server refused using binary.".to_string());
        }
        Ok(CommandResult::show(lines.join("\n")))
    }

    async fn handle_close(&mut self) -> Result<CommandResult> {
        let reply = self.session.close().await?;
        Ok(CommandResult::show(reply.text))
    }

    async fn handle_bye(&mut self) -> Result<CommandResult> {
        let mut lines = Vec::new();
        if self.session.is_connected() {
            match self.session.close().await {
                Ok(reply) => lines.push(reply.text),
                Err(e) => lines.push(e.to_string()),
            }
        }
        lines.push("good luck".to_string());
        Ok(CommandResult::exit(lines.join("\n")))
    }

    async fn handle_recv(&mut self, path: &str) -> Result<CommandResult> {
        let report = self.session.download(path).await?;
        Ok(CommandResult::show(format!("{}\n{}", report.reply, report)))
    }

    async fn handle_send(&mut self, path: &str) -> Result<CommandResult> {
        let report = self.session.upload(path).await?;
        Ok(CommandResult::show(format!("{}\n{}", report.reply, report)))
    }

    async fn handle_list(&mut self, path: Option<&str>, names_only: bool) -> Result<CommandResult> {
        let result = self.session.list(path, names_only).await?;
        Ok(CommandResult::show(format!(
            "{}\n{}",
            result.listing.trim_end(),
            result.reply
        )))
    }

    async fn handle_mkdir(&mut self, path: &str) -> Result<CommandResult> {
        let reply = self.session.make_directory(path).await?;
        Ok(CommandResult::show(reply.text))
    }

    async fn handle_rm(&mut self, path: &str) -> Result<CommandResult> {
        let reply = self.session.remove_directory(path).await?;
        Ok(CommandResult::show(reply.text))
    }

    async fn handle_cd(&mut self, path: &str) -> Result<CommandResult> {
        let reply = self.session.change_directory(path).await?;
        Ok(CommandResult::show(reply.text))
    }

    async fn handle_resume(&mut self, path: &str) -> Result<CommandResult> {
        let resumed = self.session.resume(path).await?;
        Ok(CommandResult::show(format!(
            "{}\nresuming transfer from byte {}...\n{}\n{}",
            resumed.restart_reply, resumed.offset, resumed.report.reply, resumed.report
        )))
    }

    fn handle_mode(&mut self, mode: TransferMode) -> CommandResult {
        self.session.set_mode(mode);
        match mode {
            TransferMode::Passive => CommandResult::show("switch to pasv mode"),
            TransferMode::Active => {
                let ip = self
                    .session
                    .state()
                    .local_ip()
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "unknown until connected".to_string());
                CommandResult::show(format!("switch to port mode\nip address {}", ip))
            }
        }
    }

    async fn handle_mult(&mut self) -> Result<CommandResult> {
        let reply = self.session.toggle_multithread().await?;
        Ok(CommandResult::show(reply.text))
    }

    async fn handle_encry(&mut self) -> Result<CommandResult> {
        let reply = self.session.toggle_encryption().await?;
        let state = if self.session.is_encrypted() { "on" } else { "off" };
        Ok(CommandResult::show(format!("{}\nencryption {}", reply, state)))
    }
}

fn handle_help() -> CommandResult {
    let mut lines = vec!["supported commands:".to_string()];
    lines.extend(COMMAND_TABLE.iter().map(|(_, usage)| format!("  {}", usage)));
    CommandResult::show(lines.join("\n"))
}

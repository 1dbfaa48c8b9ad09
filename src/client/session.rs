//! Client session management
//!
//! A `Session` owns the control channel and the state that outlives a single
//! command. Every operation runs to completion before the next one starts.

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::client::SessionState;
use crate::client::results::{LoginResult, ResumeResult};
use crate::config::ClientConfig;
use crate::control::ControlChannel;
use crate::crypto::{Cipher, KeyMaterial};
use crate::error::{ProtocolError, Result, SessionError};
use crate::protocol::responses::{OK, PASSWORD_REQUIRED, READY};
use crate::protocol::{Command, Reply};
use crate::transfer::{self, DataChannelSettings, ListResult, TransferMode, TransferReport};

const DEFAULT_LIST_PATH: &str = "./";

pub struct Session {
    config: Arc<ClientConfig>,
    cipher: Arc<dyn Cipher>,
    control: Option<ControlChannel>,
    state: SessionState,
}

impl Session {
    pub fn new(config: Arc<ClientConfig>, cipher: Arc<dyn Cipher>) -> Self {
        Self {
            config,
            cipher,
            control: None,
            state: SessionState::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.control.as_ref().is_some_and(|c| c.is_encrypted())
    }

    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.control.as_ref().and_then(|c| c.key_material())
    }

    fn control(&mut self) -> Result<&mut ControlChannel> {
        self.control
            .as_mut()
            .ok_or_else(|| SessionError::NotConnected.into())
    }

    /// Drops the connection and returns to the zero value. Configuration and
    /// cipher are kept.
    pub fn reset(&mut self) {
        if let Some(control) = self.control.take() {
            info!("Dropping control connection to {}", control.peer_addr());
        }
        self.state = SessionState::default();
    }

    /// Opens the control connection and reads the greeting.
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<Reply> {
        if self.state.is_logged_in() {
            return Err(SessionError::AlreadyConnected.into());
        }
        if self.control.is_some() {
            self.reset();
        }

        let mut control =
            ControlChannel::connect(host, port, self.config.buffer_size, Arc::clone(&self.cipher))
                .await?;
        let greeting = control.receive().await?;
        if greeting.code != READY {
            control.shutdown().await;
            return Err(ProtocolError::UnexpectedReply {
                expected: "service ready",
                reply: greeting,
            }
            .into());
        }

        let local_ip = self
            .config
            .local_ip_override()
            .unwrap_or_else(|| control.local_addr().ip());
        self.state.set_remote(host, port);
        self.state.set_local_ip(Some(local_ip));
        self.control = Some(control);
        Ok(greeting)
    }

    /// USER, PASS, then TYPE I.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResult> {
        let control = self.control()?;

        let reply = control
            .exchange_command(&Command::User(username.to_string()))
            .await?;
        if reply.code != PASSWORD_REQUIRED {
            return Err(SessionError::LoginRejected(reply).into());
        }

        let reply = control
            .exchange_command(&Command::Pass(password.to_string()))
            .await?;
        if !reply.is_success() {
            return Err(SessionError::LoginRejected(reply).into());
        }

        let type_reply = control.exchange_command(&Command::TypeBinary).await?;
        let binary = type_reply.code == OK;
        if !binary {
            warn!("Server refused binary mode: {}", type_reply);
        }

        self.state.set_logged_in(true);
        self.state.set_username(Some(username.to_string()));
        self.state.set_binary(binary);
        info!("Logged in as {}", username);

        Ok(LoginResult {
            username: username.to_string(),
            reply,
            binary,
        })
    }

    /// Sends QUIT and resets the session whatever the outcome.
    pub async fn close(&mut self) -> Result<Reply> {
        let mut control = self.control.take().ok_or(SessionError::NotConnected)?;
        let reply = control.exchange_command(&Command::Quit).await;
        control.shutdown().await;
        self.reset();
        reply
    }

    pub fn set_mode(&mut self, mode: TransferMode) {
        info!("Switching to {} mode", mode);
        self.state.set_mode(mode);
    }

    pub async fn make_directory(&mut self, path: &str) -> Result<Reply> {
        self.control()?
            .exchange_command(&Command::Mkd(path.to_string()))
            .await
    }

    pub async fn remove_directory(&mut self, path: &str) -> Result<Reply> {
        self.control()?
            .exchange_command(&Command::Rmd(path.to_string()))
            .await
    }

    pub async fn change_directory(&mut self, path: &str) -> Result<Reply> {
        self.control()?
            .exchange_command(&Command::Cwd(path.to_string()))
            .await
    }

    /// MULT: the server flips between single and multi-threaded sending.
    pub async fn toggle_multithread(&mut self) -> Result<Reply> {
        self.control()?.exchange_command(&Command::Mult).await
    }

    /// ENCR: switches control-channel encryption to the opposite state.
    pub async fn toggle_encryption(&mut self) -> Result<Reply> {
        let control = self.control()?;
        if control.is_encrypted() {
            control.disable_encryption().await
        } else {
            control.enable_encryption().await
        }
    }

    /// Downloads `remote_path` to the same path locally. Consumes the resume
    /// flag whether or not the transfer succeeds.
    pub async fn download(&mut self, remote_path: &str) -> Result<TransferReport> {
        let resuming = self.state.take_resume_pending();
        let settings = self.data_settings()?;
        let control = self.control()?;
        transfer::download(control, &settings, remote_path, Path::new(remote_path), resuming).await
    }

    pub async fn upload(&mut self, path: &str) -> Result<TransferReport> {
        let settings = self.data_settings()?;
        let control = self.control()?;
        transfer::upload(control, &settings, path).await
    }

    /// LIST (or NLST when `names_only`) of `path`, defaulting to `./`.
    pub async fn list(&mut self, path: Option<&str>, names_only: bool) -> Result<ListResult> {
        let path = path.unwrap_or(DEFAULT_LIST_PATH);
        let settings = self.data_settings()?;
        let control = self.control()?;
        transfer::list(control, &settings, path, names_only).await
    }

    /// Continues a download from the size of the local copy.
    pub async fn resume(&mut self, remote_path: &str) -> Result<ResumeResult> {
        let offset = tokio::fs::metadata(remote_path).await?.len();

        let restart_reply = transfer::request_restart(self.control()?, offset).await?;
        info!("Server accepted restart at {}: {}", offset, restart_reply);

        self.state.set_resume_pending(true);
        let report = self.download(remote_path).await?;
        Ok(ResumeResult {
            offset,
            restart_reply,
            report,
        })
    }

    fn data_settings(&self) -> Result<DataChannelSettings> {
        let local_ip = self.state.local_ip().ok_or(SessionError::NotConnected)?;
        Ok(DataChannelSettings {
            mode: self.state.mode(),
            local_ip,
            port_min: self.config.active_port_min,
            port_max: self.config.active_port_max,
            bind_attempts: self.config.bind_attempts,
            accept_timeout: self.config.accept_timeout(),
            reply_timeout: self.config.reply_timeout(),
            buffer_size: self.config.buffer_size,
        })
    }
}

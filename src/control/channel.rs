//! Module `channel`
//!
//! Owns the control connection. Frames outbound commands with CRLF, runs
//! whole messages through the encryption layer while it is enabled, and turns
//! inbound bytes into [`Reply`] values.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};

use crate::crypto::{Cipher, EncryptionLayer, KeyMaterial};
use crate::error::{ConnectionError, ProtocolError, Result};
use crate::protocol::{Command, Reply};

const LINE_TERMINATOR: &str = "\r\n";

/// Half-duplex command/reply channel to the server.
///
/// A reply is expected to arrive in a single read. Bytes past the first
/// newline of a read are kept for the next `receive` so two replies sharing a
/// TCP segment are still returned one at a time.
pub struct ControlChannel {
    stream: TcpStream,
    peer: SocketAddr,
    local: SocketAddr,
    pending: Vec<u8>,
    buffer_size: usize,
    encryption: EncryptionLayer,
}

impl ControlChannel {
    /// Connects to `host:port`.
    pub async fn connect(
        host: &str,
        port: u16,
        buffer_size: usize,
        cipher: Arc<dyn Cipher>,
    ) -> Result<Self> {
        let target = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&target)
            .await
            .map_err(|e| ConnectionError::Connect(target.clone(), e))?;
        info!("Control connection established to {}", target);
        Self::from_stream(stream, buffer_size, cipher)
    }

    /// Wraps an already connected stream.
    pub fn from_stream(
        stream: TcpStream,
        buffer_size: usize,
        cipher: Arc<dyn Cipher>,
    ) -> Result<Self> {
        let peer = stream.peer_addr().map_err(ConnectionError::ControlRead)?;
        let local = stream.local_addr().map_err(ConnectionError::ControlRead)?;
        Ok(Self {
            stream,
            peer,
            local,
            pending: Vec::new(),
            buffer_size,
            encryption: EncryptionLayer::new(cipher),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Local end of the control socket, used to advertise PORT addresses
    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_enabled()
    }

    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.encryption.key_material()
    }

    /// Sends one logical command.
    pub async fn send(&mut self, message: &str) -> Result<()> {
        let framed = format!("{}{}", message, LINE_TERMINATOR);
        let wire = self.encryption.encode(&framed)?;

        self.stream
            .write_all(wire.as_bytes())
            .await
            .map_err(ConnectionError::ControlWrite)?;
        self.stream.flush().await.map_err(ConnectionError::ControlWrite)?;
        Ok(())
    }

    /// Sends a typed command, logging it with secrets masked.
    pub async fn send_command(&mut self, command: &Command) -> Result<()> {
        debug!("--> {}", command.redacted());
        self.send(&command.to_string()).await
    }

    /// Reads one reply.
    pub async fn receive(&mut self) -> Result<Reply> {
        if !self.pending.contains(&b'\n') {
            let mut buffer = vec![0u8; self.buffer_size];
            let n = self
                .stream
                .read(&mut buffer)
                .await
                .map_err(ConnectionError::ControlRead)?;
            if n == 0 && self.pending.is_empty() {
                return Err(ConnectionError::ControlClosed.into());
            }
            self.pending.extend_from_slice(&buffer[..n]);
        }

        let raw: Vec<u8> = match self.pending.iter().position(|b| *b == b'\n') {
            Some(pos) => self.pending.drain(..=pos).collect(),
            None => std::mem::take(&mut self.pending),
        };

        let text = String::from_utf8_lossy(&raw);
        let plain = self.encryption.decode(text.trim_end())?;
        let reply = Reply::parse(&plain)?;
        debug!("<-- {}", reply);
        Ok(reply)
    }

    /// Sends `message` and reads its reply.
    pub async fn exchange(&mut self, message: &str) -> Result<Reply> {
        self.send(message).await?;
        self.receive().await
    }

    /// Typed variant of [`exchange`](Self::exchange).
    pub async fn exchange_command(&mut self, command: &Command) -> Result<Reply> {
        self.send_command(command).await?;
        self.receive().await
    }

    /// Reads the reply a failed transfer still owes, skipping preliminary
    /// marks. Fails with `ReplyTimeout` once `limit` has passed, after which
    /// the channel can no longer be trusted to be in step.
    pub async fn drain_final_reply(&mut self, limit: Duration) -> Result<Reply> {
        let deadline = Instant::now() + limit;
        loop {
            let reply = timeout_at(deadline, self.receive())
                .await
                .map_err(|_| ConnectionError::ReplyTimeout(limit.as_secs()))??;
            if !reply.is_preliminary() {
                return Ok(reply);
            }
            debug!("Skipping preliminary reply: {}", reply);
        }
    }

    /// Turns encryption on.
    ///
    /// `ENCR` and its key-bearing reply travel in clear. The server's
    /// confirmation that follows is already encrypted. Returns that
    /// confirmation. A 2xx reply without usable key material leaves the server
    /// encrypting while the client is not, so that error ends the session.
    pub async fn enable_encryption(&mut self) -> Result<Reply> {
        let reply = self.exchange_command(&Command::Encr).await?;
        if reply.is_failure() {
            return Err(ProtocolError::UnexpectedReply {
                expected: "encryption key",
                reply,
            }
            .into());
        }

        let key = KeyMaterial::from_reply(&reply)?;
        self.encryption.install(key);
        info!("Control channel encryption enabled with {}", self.peer);
        self.receive().await
    }

    /// Turns encryption off.
    ///
    /// `ENCR` goes out under the current key, the key is dropped, and the
    /// reply is read in clear.
    pub async fn disable_encryption(&mut self) -> Result<Reply> {
        self.send_command(&Command::Encr).await?;
        self.encryption.clear();
        info!("Control channel encryption disabled with {}", self.peer);
        self.receive().await
    }

    /// Closes the socket.
    pub async fn shutdown(mut self) {
        let _ = self.stream.shutdown().await;
    }
}

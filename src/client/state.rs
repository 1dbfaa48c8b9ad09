//! Module `state`
//!
//! Defines the `SessionState` struct holding everything a session remembers
//! between commands: the remote it is connected to, login status, data
//! connection mode and the one-shot resume flag.

use std::net::IpAddr;

use crate::transfer::TransferMode;

/// Mutable per-session state. `Default` is the disconnected zero value.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    remote: Option<(String, u16)>,
    username: Option<String>,
    is_logged_in: bool,
    is_binary: bool,
    mode: TransferMode,
    resume_pending: bool,
    local_ip: Option<IpAddr>,
}

impl SessionState {
    // --------------------
    // Getter methods
    // --------------------

    /// Returns the host and port of the control connection, if any.
    pub fn remote(&self) -> Option<(&str, u16)> {
        self.remote.as_ref().map(|(host, port)| (host.as_str(), *port))
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns whether USER/PASS succeeded on the current connection.
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Returns whether the server accepted `TYPE I`.
    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Returns whether the next download appends to the local file.
    pub fn is_resume_pending(&self) -> bool {
        self.resume_pending
    }

    /// Returns the address advertised in PORT commands.
    pub fn local_ip(&self) -> Option<IpAddr> {
        self.local_ip
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn set_remote(&mut self, host: &str, port: u16) {
        self.remote = Some((host.to_string(), port));
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.is_logged_in = logged_in;
    }

    pub fn set_binary(&mut self, binary: bool) {
        self.is_binary = binary;
    }

    pub fn set_mode(&mut self, mode: TransferMode) {
        self.mode = mode;
    }

    pub fn set_resume_pending(&mut self, pending: bool) {
        self.resume_pending = pending;
    }

    pub fn set_local_ip(&mut self, ip: Option<IpAddr>) {
        self.local_ip = ip;
    }

    /// Reads and clears the resume flag.
    pub fn take_resume_pending(&mut self) -> bool {
        std::mem::take(&mut self.resume_pending)
    }
}

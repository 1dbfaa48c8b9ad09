//! RAX FTP Client
//!
//! Protocol engine for a two-channel FTP client: control-channel exchange,
//! passive/active data connections, transfers with resume, and the `ENCR`
//! control-channel encryption extension.

pub mod client;
pub mod config;
pub mod control;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod shell;
pub mod transfer;

pub use client::Session;
pub use config::ClientConfig;
pub use error::{FtpClientError, Result};

//! FTP Transfer modes
//!
//! Passive and active data connection modes and the endpoint each produces.

use std::fmt;
use std::net::SocketAddr;

/// How the data connection is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    /// Client connects to the address the server advertises
    #[default]
    Passive,
    /// Client listens and the server connects back
    Active,
}

impl fmt::Display for TransferMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferMode::Passive => write!(f, "passive"),
            TransferMode::Active => write!(f, "active"),
        }
    }
}

/// Data endpoint for a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEndpoint {
    Connect(SocketAddr),
    Listen(u16),
}

impl fmt::Display for DataEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataEndpoint::Connect(addr) => write!(f, "connect to {}", addr),
            DataEndpoint::Listen(port) => write!(f, "listen on port {}", port),
        }
    }
}

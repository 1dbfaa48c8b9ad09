//! Error types
//!
//! Defines domain-specific error types for each layer of the FTP client.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use crate::protocol::Reply;

/// Socket-level failures on either channel
#[derive(Debug)]
pub enum ConnectionError {
    Connect(String, io::Error),
    ControlClosed,
    ControlRead(io::Error),
    ControlWrite(io::Error),
    DataConnect(SocketAddr, io::Error),
    DataBind(SocketAddr, io::Error),
    Accept(io::Error),
    AcceptTimeout(u64),
    ReplyTimeout(u64),
    DataIo(io::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Connect(addr, e) => write!(f, "Failed to connect to {}: {}", addr, e),
            ConnectionError::ControlClosed => write!(f, "Control connection closed by server"),
            ConnectionError::ControlRead(e) => write!(f, "Control channel read failed: {}", e),
            ConnectionError::ControlWrite(e) => write!(f, "Control channel write failed: {}", e),
            ConnectionError::DataConnect(addr, e) => {
                write!(f, "Failed to open data connection to {}: {}", addr, e)
            }
            ConnectionError::DataBind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            ConnectionError::Accept(e) => write!(f, "Failed to accept data connection: {}", e),
            ConnectionError::AcceptTimeout(secs) => {
                write!(f, "No data connection from server within {} seconds", secs)
            }
            ConnectionError::ReplyTimeout(secs) => {
                write!(f, "No reply from server within {} seconds", secs)
            }
            ConnectionError::DataIo(e) => write!(f, "Data connection failed: {}", e),
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Malformed or unexpected traffic on the control channel
#[derive(Debug)]
pub enum ProtocolError {
    InvalidReplyCode(String),
    UnexpectedReply { expected: &'static str, reply: Reply },
    NoPassiveAddress(String),
    AmbiguousPassiveAddress(String),
    MalformedKeyMaterial(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::InvalidReplyCode(line) => write!(f, "Invalid reply: {:?}", line),
            ProtocolError::UnexpectedReply { expected, reply } => {
                write!(f, "Expected {}, got: {}", expected, reply)
            }
            ProtocolError::NoPassiveAddress(text) => {
                write!(f, "No valid address in passive reply: {}", text)
            }
            ProtocolError::AmbiguousPassiveAddress(text) => {
                write!(f, "More than one address in passive reply: {}", text)
            }
            ProtocolError::MalformedKeyMaterial(text) => {
                write!(f, "Malformed encryption key in reply: {}", text)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Data channel could not be set up for a transfer
#[derive(Debug)]
pub enum DataChannelError {
    Rejected(Reply),
    NoAvailablePort(u16, u16),
    UnsupportedLocalAddress(String),
}

impl fmt::Display for DataChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataChannelError::Rejected(reply) => write!(f, "Server refused data connection: {}", reply),
            DataChannelError::NoAvailablePort(min, max) => {
                write!(f, "No free local port in {}-{} for active mode", min, max)
            }
            DataChannelError::UnsupportedLocalAddress(addr) => {
                write!(f, "Active mode needs an IPv4 local address, have {}", addr)
            }
        }
    }
}

impl std::error::Error for DataChannelError {}

/// Session-level misuse or login failure
#[derive(Debug)]
pub enum SessionError {
    NotConnected,
    AlreadyConnected,
    LoginRejected(Reply),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotConnected => write!(f, "Not connected"),
            SessionError::AlreadyConnected => write!(f, "You are connected, please close first"),
            SessionError::LoginRejected(reply) => write!(f, "Login failed: {}", reply),
        }
    }
}

impl std::error::Error for SessionError {}

/// Failures of the control-channel cipher
#[derive(Debug)]
pub enum CipherError {
    InvalidKey(String),
    NonAscii,
    BlockExceedsModulus(usize),
    InvalidCiphertext(String),
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherError::InvalidKey(msg) => write!(f, "Unusable encryption key: {}", msg),
            CipherError::NonAscii => write!(f, "Only ASCII text can be encrypted"),
            CipherError::BlockExceedsModulus(idx) => {
                write!(f, "Block {} does not fit under the key modulus", idx)
            }
            CipherError::InvalidCiphertext(msg) => write!(f, "Invalid ciphertext: {}", msg),
        }
    }
}

impl std::error::Error for CipherError {}

/// General FTP client error that encompasses all error types
#[derive(Debug)]
pub enum FtpClientError {
    Connection(ConnectionError),
    Protocol(ProtocolError),
    DataChannel(DataChannelError),
    ResumeRejected(Reply),
    Session(SessionError),
    Cipher(CipherError),
    Io(io::Error),
}

impl fmt::Display for FtpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpClientError::Connection(e) => write!(f, "Connection error: {}", e),
            FtpClientError::Protocol(e) => write!(f, "Protocol error: {}", e),
            FtpClientError::DataChannel(e) => write!(f, "Data channel error: {}", e),
            FtpClientError::ResumeRejected(reply) => write!(f, "Server rejected resume: {}", reply),
            FtpClientError::Session(e) => write!(f, "{}", e),
            FtpClientError::Cipher(e) => write!(f, "Encryption error: {}", e),
            FtpClientError::Io(e) => write!(f, "Local file error: {}", e),
        }
    }
}

impl std::error::Error for FtpClientError {}

impl From<ConnectionError> for FtpClientError {
    fn from(error: ConnectionError) -> Self {
        FtpClientError::Connection(error)
    }
}

impl From<ProtocolError> for FtpClientError {
    fn from(error: ProtocolError) -> Self {
        FtpClientError::Protocol(error)
    }
}

impl From<DataChannelError> for FtpClientError {
    fn from(error: DataChannelError) -> Self {
        FtpClientError::DataChannel(error)
    }
}

impl From<SessionError> for FtpClientError {
    fn from(error: SessionError) -> Self {
        FtpClientError::Session(error)
    }
}

impl From<CipherError> for FtpClientError {
    fn from(error: CipherError) -> Self {
        FtpClientError::Cipher(error)
    }
}

impl From<io::Error> for FtpClientError {
    fn from(error: io::Error) -> Self {
        FtpClientError::Io(error)
    }
}

/// Result alias used across the client
pub type Result<T> = std::result::Result<T, FtpClientError>;

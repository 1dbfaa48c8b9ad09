//! Module `commands`
//!
//! Defines the FTP commands the client puts on the control channel and their
//! wire formatting.

use std::fmt;

/// Represents an FTP command sent to the server.
///
/// Each variant corresponds to a standard FTP command or one of the server's
/// extensions. Commands that take arguments store them in the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    User(String),
    Pass(String),
    TypeBinary,
    Pasv,
    Port(String), // h1,h2,h3,h4,p1,p2
    Retr(String),
    Stor(String),
    List(String),
    Nlst(String),
    Mkd(String),
    Rmd(String),
    Cwd(String),
    Rest(u64),
    Mult, // Server-defined extension, toggles multi-threaded sending
    Encr, // Server-defined extension, toggles control-channel encryption
    Quit,
}

impl Command {
    /// Wire form with secrets masked, for logging
    pub fn redacted(&self) -> String {
        match self {
            Command::Pass(_) => "PASS ****".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::User(name) => write!(f, "USER {}", name),
            Command::Pass(password) => write!(f, "PASS {}", password),
            Command::TypeBinary => write!(f, "TYPE I"),
            Command::Pasv => write!(f, "PASV"),
            Command::Port(addr) => write!(f, "PORT {}", addr),
            Command::Retr(path) => write!(f, "RETR {}", path),
            Command::Stor(path) => write!(f, "STOR {}", path),
            Command::List(path) => write!(f, "LIST {}", path),
            Command::Nlst(path) => write!(f, "NLST {}", path),
            Command::Mkd(path) => write!(f, "MKD {}", path),
            Command::Rmd(path) => write!(f, "RMD {}", path),
            Command::Cwd(path) => write!(f, "CWD {}", path),
            Command::Rest(offset) => write!(f, "REST {}", offset),
            Command::Mult => write!(f, "MULT"),
            Command::Encr => write!(f, "ENCR"),
            Command::Quit => write!(f, "QUIT"),
        }
    }
}

//! Module `commands`
//!
//! Parses lines typed at the prompt into [`ShellCommand`] values.

use std::fmt;

/// A command typed at the `ftp >` prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Open { host: String, port: Option<u16> },
    Close,
    Bye,
    Recv(String),
    Send(String),
    Ls(Option<String>),
    Nlist(Option<String>),
    Mkdir(String),
    Rm(String),
    Cd(String),
    Resume(String),
    Pasv,
    Port,
    Mult,
    Encry,
    Help,
}

/// Name and usage of every shell command, in `help` order
pub const COMMAND_TABLE: &[(&str, &str)] = &[
    ("open", "open host[:port]   connect and log in"),
    ("close", "close              end the session"),
    ("bye", "bye                close and exit"),
    ("recv", "recv path          download a file"),
    ("send", "send path          upload a file"),
    ("ls", "ls [path]          list a directory"),
    ("nlist", "nlist [path]       list names only"),
    ("mkdir", "mkdir path         create a remote directory"),
    ("rm", "rm path            remove a remote directory"),
    ("cd", "cd path            change remote directory"),
    ("resume", "resume path        continue a partial download"),
    ("pasv", "pasv               use passive data connections"),
    ("port", "port               use active data connections"),
    ("mult", "mult               toggle server multi-threaded sending"),
    ("encry", "encry              toggle control channel encryption"),
    ("help", "help               show this list"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ShellParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidPort(String),
}

impl fmt::Display for ShellParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellParseError::Empty => write!(f, "Empty command"),
            ShellParseError::Unknown(cmd) => write!(f, "Unknown command: {}", cmd),
            ShellParseError::MissingArgument(cmd) => write!(f, "{} needs an argument", cmd),
            ShellParseError::InvalidPort(port) => write!(f, "Invalid port: {}", port),
        }
    }
}

impl std::error::Error for ShellParseError {}

impl ShellCommand {
    /// Parses a raw input line.
    ///
    /// The first word selects the command; the rest of the line, trimmed, is
    /// its argument.
    pub fn parse(raw: &str) -> Result<Self, ShellParseError> {
        let trimmed = raw.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
        let arg = parts.next().unwrap_or("").trim();

        let required = |name: &'static str| {
            if arg.is_empty() {
                Err(ShellParseError::MissingArgument(name))
            } else {
                Ok(arg.to_string())
            }
        };
        let optional = || (!arg.is_empty()).then(|| arg.to_string());

        match cmd.as_str() {
            "" => Err(ShellParseError::Empty),
            "open" => parse_open(arg),
            "close" => Ok(ShellCommand::Close),
            "bye" => Ok(ShellCommand::Bye),
            "recv" => Ok(ShellCommand::Recv(required("recv")?)),
            "send" => Ok(ShellCommand::Send(required("send")?)),
            "ls" => Ok(ShellCommand::Ls(optional())),
            "nlist" => Ok(ShellCommand::Nlist(optional())),
            "mkdir" => Ok(ShellCommand::Mkdir(required("mkdir")?)),
            "rm" => Ok(ShellCommand::Rm(required("rm")?)),
            "cd" => Ok(ShellCommand::Cd(required("cd")?)),
            "resume" => Ok(ShellCommand::Resume(required("resume")?)),
            "pasv" => Ok(ShellCommand::Pasv),
            "port" => Ok(ShellCommand::Port),
            "mult" => Ok(ShellCommand::Mult),
            "encry" => Ok(ShellCommand::Encry),
            "help" => Ok(ShellCommand::Help),
            other => Err(ShellParseError::Unknown(other.to_string())),
        }
    }
}

/// `open host`, `open host port` or `open host:port`
fn parse_open(arg: &str) -> Result<ShellCommand, ShellParseError> {
    let mut words = arg.split_whitespace();
    let target = words.next().ok_or(ShellParseError::MissingArgument("open"))?;

    let (host, port) = match (words.next(), target.split_once(':')) {
        (Some(port), _) => (target, Some(port)),
        (None, Some((host, port))) if !port.contains(':') => (host, Some(port)),
        _ => (target, None),
    };

    let port = port
        .map(|p| {
            p.parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| ShellParseError::InvalidPort(p.to_string()))
        })
        .transpose()?;

    Ok(ShellCommand::Open {
        host: host.to_string(),
        port,
    })
}

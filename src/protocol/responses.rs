//! FTP Response handling
//!
//! Defines FTP reply codes and parsing of control-channel replies.

use std::fmt;

use crate::error::ProtocolError;

/// Standard FTP reply codes the client acts on
pub const OPENING_DATA_CONNECTION: u16 = 150;
pub const OK: u16 = 200;
pub const READY: u16 = 220;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ENTERING_PASSIVE_MODE: u16 = 227;
pub const PASSWORD_REQUIRED: u16 = 331;

/// A single control-channel reply.
///
/// `text` keeps the whole trimmed line, code included, so it can be shown to
/// the user exactly as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

impl Reply {
    /// Parses a reply line. The leading token must be exactly three digits in
    /// the 100-599 range.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let text = line.trim();
        let token = text.split_whitespace().next().unwrap_or("");

        if token.len() != 3 || !token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtocolError::InvalidReplyCode(text.to_string()));
        }

        let code: u16 = token
            .parse()
            .map_err(|_| ProtocolError::InvalidReplyCode(text.to_string()))?;
        if !(100..=599).contains(&code) {
            return Err(ProtocolError::InvalidReplyCode(text.to_string()));
        }

        Ok(Self {
            code,
            text: text.to_string(),
        })
    }

    /// First digit of the code
    pub fn class(&self) -> u16 {
        self.code / 100
    }

    pub fn is_preliminary(&self) -> bool {
        self.class() == 1
    }

    pub fn is_success(&self) -> bool {
        self.class() == 2
    }

    pub fn is_intermediate(&self) -> bool {
        self.class() == 3
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.class(), 4 | 5)
    }

    /// The reply body without its code
    pub fn message(&self) -> &str {
        self.text[3..].trim_start()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

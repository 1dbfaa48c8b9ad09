//! Data connection address negotiation
//!
//! Extracts the server's data address from a PASV reply and formats the
//! client's address for PORT. No socket I/O happens here.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::error::ProtocolError;
use crate::protocol::Command;

/// Address advertised by the server in a 227 reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PassiveAddress {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for PassiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Finds the single `h1,h2,h3,h4,p1,p2` sextet in a passive-mode reply.
///
/// Each number must be 0-255 and the sextet must sit on word boundaries.
/// Zero or several sextets is an error, never a partial result.
pub fn parse_passive_reply(text: &str) -> Result<PassiveAddress, ProtocolError> {
    let mut found: Vec<[u8; 6]> = Vec::new();

    for run in numeric_runs(text) {
        let fields: Vec<&str> = run.body.split(',').collect();
        let mut i = 0;
        while i + 6 <= fields.len() {
            let starts_clean = i > 0 || run.open_start;
            let ends_clean = i + 6 < fields.len() || run.open_end;
            let octets: Option<Vec<u8>> = fields[i..i + 6].iter().map(|f| octet(f)).collect();

            match octets {
                Some(octets) if starts_clean && ends_clean => {
                    let mut sextet = [0u8; 6];
                    sextet.copy_from_slice(&octets);
                    found.push(sextet);
                    i += 6;
                }
                _ => i += 1,
            }
        }
    }

    match found.as_slice() {
        [] => Err(ProtocolError::NoPassiveAddress(text.to_string())),
        [s] => Ok(PassiveAddress {
            ip: Ipv4Addr::new(s[0], s[1], s[2], s[3]),
            port: u16::from(s[4]) * 256 + u16::from(s[5]),
        }),
        _ => Err(ProtocolError::AmbiguousPassiveAddress(text.to_string())),
    }
}

/// Formats `PORT h1,h2,h3,h4,p1,p2`. `ip` may be dotted or already
/// comma-separated.
pub fn build_active_command(ip: &str, port: u16) -> String {
    let p1 = port / 256;
    let p2 = port % 256;
    Command::Port(format!("{},{},{}", ip.replace('.', ","), p1, p2)).to_string()
}

/// A maximal stretch of digits and commas, with whether its edges touch a
/// non-word character (or the end of the text).
struct NumericRun<'a> {
    body: &'a str,
    open_start: bool,
    open_end: bool,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn numeric_runs(text: &str) -> Vec<NumericRun<'_>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    let mut prev: Option<char> = None;
    let mut before_run: Option<char> = None;

    for (idx, c) in text.char_indices() {
        let in_run = c.is_ascii_digit() || c == ',';
        match (start, in_run) {
            (None, true) => {
                start = Some(idx);
                before_run = prev;
            }
            (Some(s), false) => {
                runs.push(NumericRun {
                    body: &text[s..idx],
                    open_start: !before_run.is_some_and(is_word_char),
                    open_end: !is_word_char(c),
                });
                start = None;
            }
            _ => {}
        }
        prev = Some(c);
    }
    if let Some(s) = start {
        runs.push(NumericRun {
            body: &text[s..],
            open_start: !before_run.is_some_and(is_word_char),
            open_end: true,
        });
    }
    runs
}

fn octet(field: &str) -> Option<u8> {
    if field.is_empty() || field.len() > 3 {
        return None;
    }
    field.parse::<u8>().ok()
}

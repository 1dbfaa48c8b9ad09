//! Terminal input without echo, used for passwords.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Reads one line from the terminal without echoing it.
///
/// Raw mode is always restored, also when reading fails. Ctrl-C cancels the
/// entry with `ErrorKind::Interrupted`.
pub fn read_hidden_line() -> io::Result<String> {
    enable_raw_mode()?;
    let line = read_keys();
    disable_raw_mode()?;
    line
}

fn read_keys() -> io::Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }

        match key.code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "password entry cancelled",
                ));
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}

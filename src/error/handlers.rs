//! Error handlers
//!
//! Decides which failures leave the session usable and logs the rest.

use crate::error::types::{ConnectionError, FtpClientError, ProtocolError};
use log::{error, warn};

/// Handle an FTP client error, returning whether the session can continue.
pub fn handle_error(err: &FtpClientError) -> bool {
    if is_recoverable(err) {
        warn!("{}", err);
        true
    } else {
        error!("Session lost: {}", err);
        false
    }
}

/// A session ends when the control connection is lost or when client and
/// server may no longer agree on the next reply: an owed reply that never
/// arrived, or an `ENCR` key the client could not install. Everything else
/// aborts the current operation and keeps the session alive.
pub fn is_recoverable(err: &FtpClientError) -> bool {
    !matches!(
        err,
        FtpClientError::Connection(
            ConnectionError::ControlClosed
                | ConnectionError::ControlRead(_)
                | ConnectionError::ControlWrite(_)
                | ConnectionError::ReplyTimeout(_)
        ) | FtpClientError::Protocol(ProtocolError::MalformedKeyMaterial(_))
    )
}

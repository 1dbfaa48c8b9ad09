//! Transfer result types
//!
//! Defines result structures returned by transfer operations.

use std::fmt;
use std::time::Duration;

use crate::protocol::Reply;

/// Elapsed time is never taken as less than this when computing throughput
const MIN_ELAPSED_SECS: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Download,
    Upload,
    Listing,
}

/// Outcome of a completed download or upload
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub path: String,
    pub direction: TransferDirection,
    pub bytes: u64,
    pub elapsed: Duration,
    pub reply: Reply,
}

impl TransferReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64().max(MIN_ELAPSED_SECS)
    }

    /// Kilobytes (1000 bytes) per second
    pub fn throughput_kbps(&self) -> f64 {
        self.bytes as f64 / self.elapsed_secs() / 1e3
    }
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes in {:.6} seconds, {:.3} kb/s in avg",
            self.bytes,
            self.elapsed_secs(),
            self.throughput_kbps()
        )
    }
}

/// Outcome of a LIST or NLST
#[derive(Debug, Clone)]
pub struct ListResult {
    pub listing: String,
    pub reply: Reply,
}

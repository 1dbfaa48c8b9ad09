//! Client result types
//!
//! Defines result structures returned by session operations.

use crate::protocol::Reply;
use crate::transfer::TransferReport;

/// Result of a login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub username: String,
    pub reply: Reply,
    /// Whether the server switched to binary (`TYPE I`)
    pub binary: bool,
}

/// Result of a resumed download
#[derive(Debug, Clone)]
pub struct ResumeResult {
    pub offset: u64,
    pub restart_reply: Reply,
    pub report: TransferReport,
}

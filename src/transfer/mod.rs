//! Transfer module for the FTP client
//!
//! Handles data channel negotiation and the download, upload and listing
//! operations that run over it.

pub mod data_channel;
pub mod modes;
pub mod operations;
pub mod results;

// Re-export key types and functions
pub use data_channel::{DataChannelSettings, establish, establish_active, establish_passive};
pub use modes::{DataEndpoint, TransferMode};
pub use operations::{TransferRecord, TransferState, download, list, request_restart, upload};
pub use results::{ListResult, TransferDirection, TransferReport};

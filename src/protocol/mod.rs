//! FTP Protocol implementation
//!
//! Handles command formatting, reply parsing and data address negotiation.

pub mod address;
pub mod commands;
pub mod responses;

pub use address::{PassiveAddress, build_active_command, parse_passive_reply};
pub use commands::Command;
pub use responses::Reply;

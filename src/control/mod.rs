//! Control connection
//!
//! Command/reply exchange with the server, including the optional encryption
//! transform.

pub mod channel;

pub use channel::ControlChannel;

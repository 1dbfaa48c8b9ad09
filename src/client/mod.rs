//! Client session system
//!
//! Handles the session lifecycle: connect, login, per-command operations and
//! reset.

pub mod results;
pub mod session;
pub mod state;

pub use results::{LoginResult, ResumeResult};
pub use session::Session;
pub use state::SessionState;

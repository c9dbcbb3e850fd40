//! # heartsync-client
//!
//! Application layer of the HeartSync client: configuration, the scoped
//! [`Session`], the commands the screens invoke and the live views they
//! render from.

pub mod commands;
pub mod config;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod views;

#[cfg(test)]
mod test_support;

pub use commands::{CommandError, Notice};
pub use config::ClientConfig;
pub use session::Session;
pub use state::AppState;

//! # heartsync-store
//!
//! Device-local storage for the HeartSync client, backed by SQLite.
//!
//! Only what must survive a restart lives here: the signed-in session and the
//! user's preferences. Everything shared between partners stays in the
//! hosted backend.

pub mod database;
pub mod migrations;
pub mod preferences;
pub mod session;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use preferences::Preferences;
pub use session::PersistedSession;

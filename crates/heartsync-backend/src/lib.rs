//! # heartsync-backend
//!
//! The client's boundary with the hosted backend. Authentication, profile
//! documents, room collections with realtime snapshots and image hosting are
//! all external services; this crate defines the ports the client talks to
//! and ships two adapters:
//!
//! - [`memory::MemoryBackend`], an in-process implementation of every port
//!   used by tests and offline development;
//! - [`cloudinary::CloudinaryHost`], the HTTP image-host uploader.

pub mod cloudinary;
pub mod memory;
pub mod ports;
pub mod services;
pub mod subscription;

mod error;

pub use error::{AuthError, BackendError, BackendResult};
pub use ports::*;
pub use services::Backend;
pub use subscription::Subscription;

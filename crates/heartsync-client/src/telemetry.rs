//! Tracing setup.

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "heartsync_client=debug,heartsync_backend=info,heartsync_store=info,warn";

/// Install the global subscriber, honouring `RUST_LOG`.
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok()
}

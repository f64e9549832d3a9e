//! Tracing setup for the inscriber CLI.
//!
//! The per-index log is the operator's record of why each file was minted,
//! skipped or abandoned, so the default level is `info`. Progress files under
//! `progress_dir` remain the durable record and are unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `info` if unset. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=inscriber=debug inscriber run
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

//! Logging setup
//!
//! `RUST_LOG` overrides the level (default `info`), e.g.
//! `RUST_LOG=nanofactory=trace` to follow every reaction run.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber, writing to stderr
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

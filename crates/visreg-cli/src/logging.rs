//! Tracing subscriber setup

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber
///
/// `RUST_LOG` wins when set; otherwise the filter follows the verbosity
/// flags. A second call is a no-op.
pub fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity == Verbosity::Debug)
        .with_writer(std::io::stderr)
        .try_init();
}

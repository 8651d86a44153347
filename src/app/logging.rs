//! Logging configuration and initialization

use crate::config::AppConfig;
use tracing::{debug, trace};

/// Initialize tracing for the binary
///
/// `RUST_LOG` wins over the configured level, which wins over `-v`.
pub fn init_logging(config: &AppConfig, verbose: u8) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_filter(verbose));

    tracing_subscriber::fmt()
        .with_env_filter(filter.as_str())
        .with_target(verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("physio started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

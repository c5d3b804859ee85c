// Logging setup: `tracing` events to stderr, filtered by `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise `info`, or
/// `debug` when `verbose` is set. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

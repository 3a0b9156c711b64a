use std::env;

use librarian_core::parse_bool;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise `debug` when verbose, `info` when not.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn env_flag() -> bool {
    env::var("LIBRARIAN_VERBOSE")
        .map(|value| parse_bool(&value))
        .unwrap_or(false)
}

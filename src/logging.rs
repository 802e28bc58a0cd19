//! Tracing subscriber setup for the command-line tool.
//!
//! Logs go to stderr so that stdout stays clean for the summary or the JSON
//! report. `RUST_LOG` wins over the verbosity flag when it is set.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the level filter: `RUST_LOG` if set, else `debug` or `warn`.
pub fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "warn" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs the global subscriber.
///
/// Returns an error if a subscriber is already installed.
pub fn init(verbose: bool, color: bool) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(color)
                .compact(),
        )
        .try_init()
}

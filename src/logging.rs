//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive that overrides the config.
pub const LOG_ENV: &str = "HISTKEEP_LOG";

/// Build the filter: `HISTKEEP_LOG` if set and valid, else `default_level`,
/// else `warn`.
#[must_use]
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install a stderr fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

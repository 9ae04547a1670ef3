use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. `flightlog=debug`
pub const LOG_ENV: &str = "FLIGHTLOG_LOG";

/// Install the stderr logger. `FLIGHTLOG_LOG` wins over `default_level`;
/// an unparsable directive falls back to `warn`. Returns `false` when a
/// global subscriber was already installed; the existing one stays.
pub fn init(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "logger already installed");
            false
        }
    }
}

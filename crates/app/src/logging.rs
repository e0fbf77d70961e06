//! Tracing subscriber setup for the CLI.
//!
//! Logs go to stderr so stdout carries command output only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Level used for `-v` repetitions; the configured level otherwise.
fn effective_level(config: &LoggingConfig, verbosity: u8) -> &str {
    match verbosity {
        0 => &config.level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the filter. `RUST_LOG` wins unless `-v` was given.
fn build_filter(config: &LoggingConfig, verbosity: u8) -> EnvFilter {
    let level = effective_level(config, verbosity);
    if verbosity == 0 {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_logging(config: &LoggingConfig, verbosity: u8) {
    let registry = tracing_subscriber::registry().with(build_filter(config, verbosity));

    let result = match config.format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr).with_target(true))
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_string(),
            format: "compact".to_string(),
        }
    }

    #[test]
    fn test_verbosity_overrides_level() {
        let cfg = config("warn");
        assert_eq!(effective_level(&cfg, 0), "warn");
        assert_eq!(effective_level(&cfg, 1), "info");
        assert_eq!(effective_level(&cfg, 2), "debug");
        assert_eq!(effective_level(&cfg, 7), "trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(&config("warn"), 0);
        init_logging(&config("debug"), 2);
    }
}

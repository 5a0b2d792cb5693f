//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Picks the filter directive: each `-v` raises verbosity past the
/// configured level; with no `-v` the configured level is used as is.
pub fn filter_directive(config: &LoggingConfig, verbose: u8) -> String {
    match verbose {
        0 => config.level.clone(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Installs the global subscriber. Call once, before any work starts.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let directive = filter_directive(config, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    tracing::debug!(filter = %directive, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig {
            level: "rowguard=warn".to_string(),
            format: LogFormat::Text,
        };
        assert_eq!(filter_directive(&config, 0), "rowguard=warn");
        assert_eq!(filter_directive(&config, 1), "info");
        assert_eq!(filter_directive(&config, 2), "debug");
        assert_eq!(filter_directive(&config, 5), "trace");
    }
}

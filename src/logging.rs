//! Tracing subscriber setup

use crate::config::LoggingConfig;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_target(true).with_current_span(true));
    let text_layer = (!config.json).then(|| fmt::layer().with_target(true).with_thread_ids(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails_instead_of_panicking() {
        let config = LoggingConfig::default();
        // The first call may lose to another test's subscriber; the second never wins
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}

//! Logging setup for the coordination core
//!
//! Structured logging via the `tracing` crate. Components log registrations,
//! sends, and state transitions at debug/info level.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the application
///
/// Sets up a tracing subscriber from the logging section of the config.
/// Should be called once at process startup.
///
/// # Example
///
/// ```
/// use concord_core::config::LoggingConfig;
/// use concord_core::logging::init_logging;
///
/// init_logging(&LoggingConfig::default());
/// ```
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = if config.json {
        // JSON format for production/structured logging
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        // Human-readable format for development
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init()
    };

    // A second init (tests, embedding hosts) keeps the existing subscriber.
    if result.is_ok() {
        tracing::info!("Logging initialized at level: {}", config.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_reentrant() {
        let config = LoggingConfig::default();
        init_logging(&config);
        // Second call must not panic
        init_logging(&config);
    }
}

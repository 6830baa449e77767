//! Concord Core
//!
//! This crate provides the shared foundation for the coordination core:
//! error handling, configuration, and logging setup.

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{load_config, load_config_or_default, AckPolicy, CoordConfig};
pub use error::{CoreError, Result};
pub use logging::init_logging;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_functionality() {
        // Smoke test - verify module exports are accessible
        let config = CoordConfig::default();
        assert_eq!(config.hub.history_cap, 1024);
    }
}

//! Configuration for the coordination core
//!
//! Configuration is loaded from multiple sources:
//! - Default values
//! - Configuration files (TOML, JSON, YAML)
//! - Environment variables (`CONCORD__` prefix)

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration for the coordination core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Communication hub settings
    #[serde(default)]
    pub hub: HubConfig,

    /// Knowledge exchange settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Collaboration engine settings
    #[serde(default)]
    pub collab: CollabConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format
    #[serde(default)]
    pub json: bool,
}

/// Communication hub settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Maximum number of messages kept in the audit history
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Seconds a message stays in history before it is prunable
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Capacity of the coordination event broadcast channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Maximum delivery-log records retained
    #[serde(default = "default_delivery_log_cap")]
    pub delivery_log_cap: usize,
}

/// Knowledge exchange settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Default traversal depth for related-knowledge lookups
    #[serde(default = "default_related_depth")]
    pub related_depth: usize,
}

/// Acknowledgment policy for collaboration sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckPolicy {
    /// The first participant acknowledgment activates the session
    FirstAck,

    /// Every participant must acknowledge before activation
    AllAcks,
}

/// Collaboration engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollabConfig {
    /// When a proposed session becomes active
    #[serde(default = "default_ack_policy")]
    pub ack_policy: AckPolicy,

    /// Maximum length of a team purpose label
    #[serde(default = "default_max_purpose_len")]
    pub max_purpose_len: usize,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_cap() -> usize {
    1024
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_event_capacity() -> usize {
    1024
}

fn default_delivery_log_cap() -> usize {
    4096
}

fn default_related_depth() -> usize {
    2
}

fn default_ack_policy() -> AckPolicy {
    AckPolicy::FirstAck
}

fn default_max_purpose_len() -> usize {
    120
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            retention_secs: default_retention_secs(),
            event_capacity: default_event_capacity(),
            delivery_log_cap: default_delivery_log_cap(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            related_depth: default_related_depth(),
        }
    }
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            ack_policy: default_ack_policy(),
            max_purpose_len: default_max_purpose_len(),
        }
    }
}

/// Load configuration from a file
///
/// Supports TOML, JSON, and YAML formats based on file extension.
/// Environment variables prefixed with `CONCORD__` override file values.
///
/// # Example
///
/// ```no_run
/// use concord_core::config::load_config;
///
/// let config = load_config("concord.toml").unwrap();
/// println!("History cap: {}", config.hub.history_cap);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CoordConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CoreError::config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("CONCORD").separator("__"))
        .build()?;

    let config: CoordConfig = settings.try_deserialize()?;

    tracing::info!("Configuration loaded from {}", path.display());

    Ok(config)
}

/// Load configuration with defaults if the file doesn't exist
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> CoordConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            CoordConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.hub.history_cap, 1024);
        assert_eq!(config.hub.retention_secs, 3600);
        assert_eq!(config.knowledge.related_depth, 2);
        assert_eq!(config.collab.ack_policy, AckPolicy::FirstAck);
    }

    #[test]
    fn test_config_serialization() {
        let config = CoordConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: CoordConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.hub.history_cap, deserialized.hub.history_cap);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "logging": {
                "level": "debug",
                "json": true
            },
            "hub": {
                "history_cap": 64,
                "retention_secs": 60
            },
            "collab": {
                "ack_policy": "all_acks"
            }
        }"#;

        let config: CoordConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.hub.history_cap, 64);
        assert_eq!(config.collab.ack_policy, AckPolicy::AllAcks);
        // Untouched sections fall back to defaults
        assert_eq!(config.knowledge.related_depth, 2);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_or_default() {
        let config = load_config_or_default("nonexistent.toml");
        assert_eq!(config.hub.history_cap, 1024);
    }
}

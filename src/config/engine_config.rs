use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use super::{deserialize_duration_from_seconds, serialize_duration_to_seconds};

/// Provides the default value for interval_length.
fn default_interval_length() -> Duration {
    Duration::from_secs(60)
}

/// Provides the default value for notification_timeout.
fn default_notification_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Provides the default value for notifications_enabled.
fn default_notifications_enabled() -> bool {
    true
}

/// Provides the default value for log_notifications.
fn default_log_notifications() -> bool {
    true
}

/// Engine configuration for herald.
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// The base interval unit. Notification intervals and first-notification
    /// delays are expressed as multiples of this.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_interval_length"
    )]
    pub interval_length: Duration,

    /// Wall-clock cap per notification command execution.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_notification_timeout"
    )]
    pub notification_timeout: Duration,

    /// Program-wide notification master switch.
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,

    /// Whether an audit line is written per contact per command.
    #[serde(default = "default_log_notifications")]
    pub log_notifications: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            interval_length: default_interval_length(),
            notification_timeout: default_notification_timeout(),
            notifications_enabled: default_notifications_enabled(),
            log_notifications: default_log_notifications(),
        }
    }
}

impl EngineConfig {
    /// Loads the configuration, layering an optional `herald.toml` in the
    /// given directory under `HERALD_`-prefixed environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(dir) = config_dir {
            let path = Path::new(dir).join("herald.toml");
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(Environment::with_prefix("HERALD"));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.interval_length, Duration::from_secs(60));
        assert_eq!(config.notification_timeout, Duration::from_secs(30));
        assert!(config.notifications_enabled);
        assert!(config.log_notifications);
    }

    #[test]
    fn test_new_without_config_dir_uses_defaults() {
        let config = EngineConfig::new(None).unwrap();
        assert_eq!(config.interval_length, Duration::from_secs(60));
        assert!(config.notifications_enabled);
    }

    #[test]
    fn test_deserialize_from_toml_fragment() {
        let config: EngineConfig = Config::builder()
            .add_source(config::File::from_str(
                "interval_length = 30\nnotifications_enabled = false",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.interval_length, Duration::from_secs(30));
        assert!(!config.notifications_enabled);
        assert_eq!(config.notification_timeout, Duration::from_secs(30));
    }
}

//! Configuration loading and typed config structures for Shardwatch.
//!
//! The canonical configuration lives in `shardwatch-config.yaml`. This
//! module defines strongly-typed structs that mirror the YAML structure and
//! a loader that reads and validates the file. Every field has a default,
//! so an empty document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but cannot be used.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShardwatchConfig {
    /// Refresh timing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Where the artifact feed is fetched from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Read-only observer API.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Change-notification settings.
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShardwatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SHARDWATCH_ENDPOINT` overrides `source.endpoint_url`
    /// - `SHARDWATCH_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, apply environment
    /// overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML or
    /// [`ConfigError::Invalid`] if a value is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SHARDWATCH_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("SHARDWATCH_ENDPOINT") {
            self.source.endpoint_url = val;
        }
        if let Ok(val) = std::env::var("SHARDWATCH_OBSERVER_PORT") {
            self.observer.port = val.parse().map_err(|e| ConfigError::Invalid {
                reason: format!("SHARDWATCH_OBSERVER_PORT={val}: {e}"),
            })?;
        }
        Ok(())
    }

    /// Reject values the service cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.success_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                reason: "schedule.success_interval_secs must be at least 1".to_owned(),
            });
        }
        if self.hooks.channel_capacity == 0 {
            return Err(ConfigError::Invalid {
                reason: "hooks.channel_capacity must be at least 1".to_owned(),
            });
        }
        if self.source.endpoint_url.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "source.endpoint_url must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Refresh timing.
///
/// Successful refreshes land on a shared clock grid of
/// `success_interval_secs` plus a random offset below
/// `jitter_window_secs`. Failed fetches retry after a flat
/// `failure_retry_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Grid spacing for refreshes after a successful fetch.
    #[serde(default = "default_success_interval_secs")]
    pub success_interval_secs: u64,

    /// Width of the random offset added to each grid boundary.
    #[serde(default = "default_jitter_window_secs")]
    pub jitter_window_secs: u64,

    /// Flat delay before retrying a failed fetch.
    #[serde(default = "default_failure_retry_secs")]
    pub failure_retry_secs: u64,

    /// Delay before the very first fetch after startup.
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
}

impl ScheduleConfig {
    /// Grid spacing as a [`Duration`].
    pub const fn success_interval(&self) -> Duration {
        Duration::from_secs(self.success_interval_secs)
    }

    /// Jitter window as a [`Duration`].
    pub const fn jitter_window(&self) -> Duration {
        Duration::from_secs(self.jitter_window_secs)
    }

    /// Failure retry delay as a [`Duration`].
    pub const fn failure_retry(&self) -> Duration {
        Duration::from_secs(self.failure_retry_secs)
    }

    /// Startup delay as a [`Duration`].
    pub const fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            success_interval_secs: default_success_interval_secs(),
            jitter_window_secs: default_jitter_window_secs(),
            failure_retry_secs: default_failure_retry_secs(),
            startup_delay_ms: default_startup_delay_ms(),
        }
    }
}

/// Artifact feed location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// URL the empty request object is posted to.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl SourceConfig {
    /// Request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Observer API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether the observer server is started.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host address to bind to.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Change-notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HooksConfig {
    /// Buffered events per subscriber before it starts lagging.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_true() -> bool {
    true
}

const fn default_success_interval_secs() -> u64 {
    3600
}

const fn default_jitter_window_secs() -> u64 {
    120
}

const fn default_failure_retry_secs() -> u64 {
    120
}

const fn default_startup_delay_ms() -> u64 {
    1
}

fn default_endpoint_url() -> String {
    String::from("http://127.0.0.1:8000/r/getArtifactPortals")
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_observer_host() -> String {
    String::from("0.0.0.0")
}

const fn default_observer_port() -> u16 {
    8080
}

const fn default_channel_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    String::from("info")
}

//! Configuration types for the Mobile Log MCP Server.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Server configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Server settings
    pub server: ServerSettings,
    /// Log capture settings
    pub capture: CaptureSettings,
    /// Device resolver settings
    pub resolver: ResolverSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.capture.buffer_capacity == 0 {
            return Err(Error::Config(
                "capture.buffer_capacity must be > 0".to_string(),
            ));
        }

        if self.capture.default_tail_lines == 0 {
            return Err(Error::Config(
                "capture.default_tail_lines must be > 0".to_string(),
            ));
        }

        if self.resolver.request_timeout_ms == 0 {
            return Err(Error::Config(
                "resolver.request_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Transport type (stdio only for now)
    pub transport: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            transport: "stdio".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Log capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Maximum buffered lines per session (oldest evicted first)
    pub buffer_capacity: usize,
    /// Delay before checking whether a freshly spawned capture process
    /// already died, in milliseconds
    pub settle_delay_ms: u64,
    /// Default number of lines returned by get_logs
    pub default_tail_lines: usize,
    /// Upper bound on waiting for process exit during an awaited stop,
    /// in milliseconds
    pub stop_wait_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            buffer_capacity: 10_000,
            settle_delay_ms: 1000,
            default_tail_lines: 100,
            stop_wait_ms: 2000,
        }
    }
}

/// Device resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// HTTP request timeout for the capability lookup, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,
        }
    }
}

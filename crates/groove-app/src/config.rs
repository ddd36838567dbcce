//! Runtime configuration.
//!
//! Covers wiring only - frame rate of the synthetic source and the clock
//! tick period. Dance-detection sensitivity is deliberately not
//! configurable here; the tuned thresholds are compiled in.

use serde::{Deserialize, Serialize};

/// Complete runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pose source configuration
    pub source: SourceConfig,

    /// Wall-clock tick configuration
    pub clock: ClockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Frames per second the synthetic source produces
    pub fps: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Wall-clock check period (seconds)
    pub tick_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig { fps: 30 },
            clock: ClockConfig { tick_secs: 1 },
        }
    }
}

impl AppConfig {
    /// Load configuration from file, layered with `GROOVE_`-prefixed
    /// environment variables
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GROOVE"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GROOVE"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source.fps, 30);
        assert_eq!(config.clock.tick_secs, 1);
    }
}

//! `suitescore.toml` settings.
//!
//! Every field has a default, so a missing file or an empty table gives a
//! usable configuration. Aggregation itself reads nothing from here.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "suitescore.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub diff: DiffSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSettings {
    /// Score deltas at or below this are reported as unchanged.
    pub epsilon: f64,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self { epsilon: 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    /// Timeout for HTTP report sources.
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn parse(s: &str, origin: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or from `suitescore.toml` in the working
    /// directory when no path is given. Only an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Reject values that parse but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.diff.epsilon.is_finite() || self.diff.epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                key: "diff.epsilon",
                reason: format!("must be a finite number >= 0, got {}", self.diff.epsilon),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "fetch.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Replace the diff threshold, validating the new value.
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self, ConfigError> {
        self.diff.epsilon = epsilon;
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

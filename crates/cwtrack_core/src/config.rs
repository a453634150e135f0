//! Core configuration.
//!
//! Loaded from one YAML file with field-level defaults, then overridden by
//! environment variables:
//! - `CWTRACK_LOG_LEVEL` - logging level (`trace|debug|info|warn|error`)
//! - `CWTRACK_LOG_DIR` - absolute rolling log directory
//! - `CWTRACK_ADJUSTMENT_POLICY` - `sticky` or `reset`

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_LOG_LEVEL: &str = "CWTRACK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CWTRACK_LOG_DIR";
pub const ENV_ADJUSTMENT_POLICY: &str = "CWTRACK_ADJUSTMENT_POLICY";

/// How a previously recorded adjustment behaves on later recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentPolicy {
    /// A non-null adjustment is re-derived on every recompute, even when the
    /// pass anchors on the actual performance (yielding zero drift).
    #[default]
    Sticky,
    /// The adjustment is cleared whenever the anchor resets to the actual
    /// performance.
    Reset,
}

impl AdjustmentPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sticky => "sticky",
            Self::Reset => "reset",
        }
    }
}

impl FromStr for AdjustmentPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sticky" => Ok(Self::Sticky),
            "reset" => Ok(Self::Reset),
            other => Err(ConfigError::InvalidValue {
                field: "adjustment_policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Due engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub adjustment_policy: AdjustmentPolicy,
}

/// Rolling file logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. Logging stays disabled when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Root configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Parses a YAML document. An empty document yields defaults.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_yaml_str(&source)
    }

    /// Loads the optional file and applies process environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `CWTRACK_*` names.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|value| !value.trim().is_empty()) {
            self.logging.dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(policy) = lookup(ENV_ADJUSTMENT_POLICY) {
            self.engine.adjustment_policy = policy.parse()?;
        }
        Ok(self)
    }
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
    InvalidValue { field: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config: {message}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value `{value}` for {field}")
            }
        }
    }
}

impl Error for ConfigError {}

//! Core runtime configuration.
//!
//! # Responsibility
//! - Deserialize `recall.toml` into typed settings with defaults.
//! - Validate values before they reach logging or storage bootstrap.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - Configured paths must be absolute.

use crate::logging::{default_log_level, LogLevel};
use crate::propagation::TagUpdatePolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `None` opens an in-memory database.
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; `None` leaves logging uninitialized.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagsConfig {
    pub default_update_policy: TagUpdatePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub tags: TagsConfig,
}

impl RecallConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging
            .level
            .parse::<LogLevel>()
            .map_err(ConfigError::Invalid)?;
        for (key, path) in [
            ("storage.database_path", &self.storage.database_path),
            ("logging.directory", &self.logging.directory),
        ] {
            if let Some(path) = path {
                if !path.is_absolute() {
                    return Err(ConfigError::Invalid(format!(
                        "{key} must be an absolute path, got `{}`",
                        path.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RecallConfig};
    use crate::logging::default_log_level;
    use crate::propagation::TagUpdatePolicy;

    #[test]
    fn empty_text_yields_defaults() {
        let config = RecallConfig::from_toml_str("").unwrap();
        assert_eq!(config.storage.database_path, None);
        assert_eq!(config.logging.level, default_log_level());
        assert_eq!(
            config.tags.default_update_policy,
            TagUpdatePolicy::PreserveCustom
        );
    }

    #[test]
    fn sections_override_defaults() {
        let config = RecallConfig::from_toml_str(
            r#"
            [logging]
            level = "warn"

            [tags]
            default_update_policy = "complete_override"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.tags.default_update_policy,
            TagUpdatePolicy::CompleteOverride
        );
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let err = RecallConfig::from_toml_str("[tags]\ndefault_update_policy = \"merge\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn relative_database_path_is_rejected() {
        let err = RecallConfig::from_toml_str("[storage]\ndatabase_path = \"data/recall.db\"")
            .unwrap_err();
        match err {
            ConfigError::Invalid(message) => assert!(message.contains("storage.database_path")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let err = RecallConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

//! Host configuration schemas.
//!
//! Deserialized via the `config` crate from an optional TOML file overlaid
//! with `CALCULATOR__*` environment variables.

pub mod logging;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::result::AppResult;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "CALCULATOR";

/// Root host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Plugin library settings.
    #[serde(default)]
    pub plugin: PluginConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Plugin library configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Path to the plugin shared library. When unset the host resolves the
    /// exports from the statically linked plugin.
    #[serde(default)]
    pub library_path: Option<String>,
}

impl HostConfig {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(path: &str) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.toml");
        let config = HostConfig::load(path.to_str().expect("utf8")).expect("load");
        assert_eq!(config.plugin.library_path, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_file_values_are_read() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("host.toml");
        std::fs::write(
            &path,
            "[plugin]\nlibrary_path = \"/opt/plugins/libcalculator_plugin.so\"\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
        )
        .expect("write");

        let config = HostConfig::load(path.to_str().expect("utf8")).expect("load");
        assert_eq!(
            config.plugin.library_path.as_deref(),
            Some("/opt/plugins/libcalculator_plugin.so")
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("host.toml");
        std::fs::write(&path, "[logging]\nformat = \"json\"\n").expect("write");

        let config = HostConfig::load(path.to_str().expect("utf8")).expect("load");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("host.toml");
        std::fs::write(&path, "[plugin\nlibrary_path = 1\n").expect("write");

        let err = HostConfig::load(path.to_str().expect("utf8")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Configuration);
        assert!(err.message.starts_with("Failed to build config"));
    }
}

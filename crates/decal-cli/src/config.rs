//! Persisted CLI configuration
//!
//! A small TOML file in the platform config directory, holding the three
//! knobs a user otherwise has to pass on every invocation: where the block
//! compressor binary lives, and the default bundle/output directories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or saving the CLI configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not determine a platform config directory
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,

    /// I/O error reading or writing the config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file's contents were not valid TOML
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The config could not be serialized back to TOML
    #[error("could not serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Persisted decal-cli configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DecalConfig {
    /// Path to the external block-compressor binary
    pub compressor_path: Option<PathBuf>,
    /// Default directory to look for bundle directories in
    pub bundles_dir: Option<PathBuf>,
    /// Default directory to write repacked archives to
    pub output_dir: Option<PathBuf>,
}

impl DecalConfig {
    /// Path the config is expected to live at: `<platform config dir>/decal-toolkit/config.toml`.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("decal-toolkit").join("config.toml"))
    }

    /// Load the config at `path`, or return the default config if the file
    /// does not exist.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Serialize and write this config to `path`, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = DecalConfig::load(&path).unwrap();
        assert_eq!(config, DecalConfig::default());
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = DecalConfig {
            compressor_path: Some(PathBuf::from("/usr/local/bin/texconv")),
            bundles_dir: Some(PathBuf::from("/home/user/bundles")),
            output_dir: Some(PathBuf::from("/home/user/out")),
        };
        config.save(&path).unwrap();

        let loaded = DecalConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not valid toml {{{").unwrap();
        let err = DecalConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}

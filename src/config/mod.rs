//! Configuration management for dispatchdesk.
//!
//! This module handles loading, saving, and validating the user configuration:
//! backend profiles, application settings, and translation overrides.

mod profile;
mod settings;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use profile::Profile;
pub use settings::Settings;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "DISPATCHDESK_CONFIG";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    #[error("failed to create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("failed to read configuration file: {0}")]
    ReadError(std::io::Error),

    #[error("failed to write configuration file: {0}")]
    WriteError(std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The complete configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application settings.
    pub settings: Settings,
    /// Configured backend profiles.
    pub profiles: Vec<Profile>,
    /// Translation overrides, keyed by language code and then label key.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub translations: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// Path of the configuration file.
    ///
    /// `DISPATCHDESK_CONFIG` wins over the platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join("dispatchdesk").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the configuration from the default location.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load and validate the configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), profiles = config.profiles.len(), "Configuration loaded");
        Ok(config)
    }

    /// Validate and write the configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;

        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Validate all profiles and cross-references.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate profile name '{}'",
                    profile.name
                )));
            }
        }

        if let Some(default) = &self.settings.default_profile {
            if !seen.contains(default.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "default profile '{}' is not configured",
                    default
                )));
            }
        }

        if self.settings.language.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "language cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the default profile.
    ///
    /// Falls back to the first profile when no default is set.
    pub fn get_default_profile(&self) -> Option<&Profile> {
        match &self.settings.default_profile {
            Some(name) => self.profiles.iter().find(|p| &p.name == name),
            None => self.profiles.first(),
        }
    }

    /// Get a profile by name.
    pub fn get_profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn sample_config() -> Config {
        let mut config = Config::default();
        config.settings.default_profile = Some("main".to_string());
        config.profiles.push(Profile::new("main", "https://ops.example.com"));
        config
            .profiles
            .push(Profile::new("staging", "http://localhost:8000").with_business_user("7"));
        config
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = sample_config();
        config
            .translations
            .entry("ar".to_string())
            .or_default()
            .insert("status.pending".to_string(), "قيد الانتظار".to_string());

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_error_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[profiles]\nname = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_profiles_rejected() {
        let mut config = sample_config();
        config.profiles.push(Profile::new("main", "https://other.example.com"));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate profile name 'main'"));
    }

    #[test]
    fn test_unknown_default_profile_rejected() {
        let mut config = sample_config();
        config.settings.default_profile = Some("prod".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'prod' is not configured"));
    }

    #[test]
    fn test_default_profile_lookup() {
        let mut config = sample_config();
        assert_eq!(config.get_default_profile().unwrap().name, "main");

        config.settings.default_profile = None;
        assert_eq!(config.get_default_profile().unwrap().name, "main");

        assert_eq!(
            config.get_profile("staging").unwrap().business_user_id.as_deref(),
            Some("7")
        );
        assert!(matches!(
            config.get_profile("prod"),
            Err(ConfigError::ProfileNotFound(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::env::set_var(CONFIG_PATH_ENV, &path);

        let resolved = Config::config_path().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(resolved, path);
    }

    #[test]
    #[serial]
    fn test_load_uses_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        sample_config().save_to(&path).unwrap();
        std::env::set_var(CONFIG_PATH_ENV, &path);

        let loaded = Config::load();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(loaded.unwrap().profiles.len(), 2);
    }
}

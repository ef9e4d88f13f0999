use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{error::ConfigError, model::Coordinate};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "CLIMA_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_ICON_HOST: &str = "openweathermap.org";
pub const DEFAULT_LANG: &str = "es";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Device location settings.
///
/// `enabled` plays the role of the user's location permission; coordinates are
/// the last known fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub enabled: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// lang = "es"
///
/// [location]
/// enabled = true
/// latitude = -34.9
/// longitude = -56.2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub lang: String,
    pub base_url: String,
    pub icon_host: String,
    pub timeout_secs: u64,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            lang: DEFAULT_LANG.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            icon_host: DEFAULT_ICON_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

        let cfg: Config = toml::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Save config to the platform config dir, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }

        let toml = toml::to_string_pretty(self)?;

        fs::write(path, toml).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("dev", "clima", "clima").ok_or(ConfigError::NoConfigDir)?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The API key, with `CLIMA_API_KEY` taking precedence over the file.
    ///
    /// Resolved once at startup; a missing or blank key is an error.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key_with(from_env.as_deref())
    }

    pub(crate) fn resolve_api_key_with(&self, from_env: Option<&str>) -> Result<String, ConfigError> {
        Self::pick_api_key(from_env, self.api_key.as_deref())
    }

    fn pick_api_key(from_env: Option<&str>, from_file: Option<&str>) -> Result<String, ConfigError> {
        from_env
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or_else(|| from_file.map(str::trim).filter(|k| !k.is_empty()))
            .map(str::to_owned)
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }
}

//! Application configuration management.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use color_eyre::Result;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Last.fm configuration
    #[serde(default)]
    pub lastfm: LastfmConfig,

    /// UI configuration
    #[serde(default)]
    pub ui: UiConfig,

    /// Library configuration
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Last.fm web service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastfmConfig {
    /// API key issued by Last.fm
    #[serde(default)]
    pub api_key: String,

    /// Download artist information for the playing track
    #[serde(default = "default_true")]
    pub download_artist_information: bool,

    /// Web service root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// ISO 639-1 code of the interface language
    #[serde(default = "default_language")]
    pub language: String,

    /// Show artist artwork (requires sixel/kitty support)
    #[serde(default = "default_true")]
    pub show_artist_image: bool,
}

/// Library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Path of the JSON library file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    String::from("https://ws.audioscrobbler.com/2.0/")
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_language() -> String {
    String::from("EN")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lastfm: LastfmConfig::default(),
            ui: UiConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

impl Default for LastfmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            download_artist_information: true,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            show_artist_image: true,
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("artist-panel").join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        config.ui.language = config.ui.language.to_uppercase();

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Whether Last.fm requests can be made at all.
    pub fn has_api_key(&self) -> bool {
        !self.lastfm.api_key.trim().is_empty()
    }
}

/// Read access to the persisted settings consulted on every resolution cycle.
pub trait SettingsStore: Send + Sync {
    /// Whether artist information should be downloaded.
    fn download_artist_information(&self) -> bool;
}

/// Configuration shared between the UI and background services.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    inner: Arc<RwLock<Config>>,
    path: Option<PathBuf>,
}

impl SharedSettings {
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Snapshot of the current configuration.
    pub fn snapshot(&self) -> Config {
        match self.inner.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Enable or disable artist information downloads and persist the change.
    pub fn set_download_artist_information(&self, enabled: bool) -> Result<()> {
        let config = {
            let mut config = match self.inner.write() {
                Ok(config) => config,
                Err(poisoned) => poisoned.into_inner(),
            };
            config.lastfm.download_artist_information = enabled;
            config.clone()
        };

        if let Some(path) = &self.path {
            config.save_to(path)?;
        }

        Ok(())
    }

    /// Record the selected language and persist the change.
    pub fn set_language(&self, code: &str) -> Result<()> {
        let config = {
            let mut config = match self.inner.write() {
                Ok(config) => config,
                Err(poisoned) => poisoned.into_inner(),
            };
            config.ui.language = code.to_string();
            config.clone()
        };

        if let Some(path) = &self.path {
            config.save_to(path)?;
        }

        Ok(())
    }
}

impl SettingsStore for SharedSettings {
    fn download_artist_information(&self) -> bool {
        match self.inner.read() {
            Ok(config) => config.lastfm.download_artist_information,
            Err(poisoned) => poisoned.into_inner().lastfm.download_artist_information,
        }
    }
}

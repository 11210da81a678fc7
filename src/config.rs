//! User configuration loaded from `~/.config/tunebox/config.toml`

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_DIR: &str = "tunebox";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub backends: BackendsConfig,
    pub player: PlayerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub api_base: String,
    pub market: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: "65b708073fc0480ea92a077233ca87bd".to_string(),
            redirect_uri: "http://127.0.0.1:8898/login".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
            market: "US".to_string(),
        }
    }
}

/// Base URLs of the non-Spotify services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    pub library_base: String,
    pub movie_base: String,
    pub lyrics_base: String,
    pub lyrics_api_key: String,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            library_base: "https://musicplayernodejs-production.up.railway.app".to_string(),
            movie_base: "http://localhost:3000".to_string(),
            lyrics_base: "https://api.happi.dev/v1".to_string(),
            lyrics_api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume change per up/down key press, as a fraction of full volume
    pub volume_step: f32,
    pub sync_interval_ms: u64,
    pub local_device: bool,
    pub device_name: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume_step: 0.1,
            sync_interval_ms: 3000,
            local_device: true,
            device_name: "tunebox".to_string(),
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Load the config file, writing the template on first run.
    pub fn load_or_create() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, CONFIG_TEMPLATE)?;
            tracing::info!(path = %path.display(), "Wrote default config template");
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.player.volume_step) || self.player.volume_step == 0.0 {
            return Err(ConfigError::Invalid {
                field: "player.volume_step",
                reason: format!("{} is not in (0, 1]", self.player.volume_step),
            });
        }
        if self.player.sync_interval_ms < 500 {
            return Err(ConfigError::Invalid {
                field: "player.sync_interval_ms",
                reason: "must be at least 500".to_string(),
            });
        }
        for (field, url) in [
            ("spotify.api_base", &self.spotify.api_base),
            ("backends.library_base", &self.backends.library_base),
            ("backends.movie_base", &self.backends.movie_base),
            ("backends.lyrics_base", &self.backends.lyrics_base),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }
        Ok(())
    }
}

const CONFIG_TEMPLATE: &str = r#"# tunebox configuration

[spotify]
# OAuth client used for the browser login
# client_id = "65b708073fc0480ea92a077233ca87bd"
# redirect_uri = "http://127.0.0.1:8898/login"
# api_base = "https://api.spotify.com/v1"
# market = "US"

[backends]
# Custom backend holding the liked library
# library_base = "https://musicplayernodejs-production.up.railway.app"
# Local video backend
# movie_base = "http://localhost:3000"
# Happi lyrics API
# lyrics_base = "https://api.happi.dev/v1"
lyrics_api_key = ""

[player]
# volume_step = 0.1
# sync_interval_ms = 3000
# local_device = true
# device_name = "tunebox"
"#;

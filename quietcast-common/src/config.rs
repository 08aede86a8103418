//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_ENV_VAR: &str = "QUIETCAST_ROOT";

/// Resolve the root folder with the following priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(root_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Locate the platform configuration file
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/quietcast/config.toml first, then /etc/quietcast/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("quietcast").join("config.toml"));
        let system_config = PathBuf::from("/etc/quietcast/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("quietcast").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("quietcast"))
        .unwrap_or_else(|| PathBuf::from("./quietcast_data"))
}

/// Ensure the root folder exists, creating it if needed
pub fn ensure_root_folder(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    Ok(())
}

/// Database file path inside the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join("quietcast.db")
}

/// Application configuration, loaded from `config.toml` in the root folder
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub media: MediaConfig,
}

/// HTTP server bind configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5740,
        }
    }
}

/// Hosted media store credentials
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mediastore.example/v1".to_string(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
        }
    }
}

impl MediaConfig {
    /// True when credentials are present; uploads fail fast otherwise
    pub fn is_configured(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

/// Load `config.toml` from the root folder; missing file yields defaults.
/// Media credentials may be supplied or overridden via environment
/// variables (QUIETCAST_MEDIA_CLOUD_NAME, QUIETCAST_MEDIA_API_KEY,
/// QUIETCAST_MEDIA_API_SECRET).
pub fn load_app_config(root: &Path) -> Result<AppConfig> {
    let config_path = root.join("config.toml");

    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        toml::from_str::<AppConfig>(&content)
            .map_err(|e| Error::Config(format!("Invalid config.toml: {}", e)))?
    } else {
        AppConfig::default()
    };

    if let Ok(value) = std::env::var("QUIETCAST_MEDIA_CLOUD_NAME") {
        config.media.cloud_name = value;
    }
    if let Ok(value) = std::env::var("QUIETCAST_MEDIA_API_KEY") {
        config.media.api_key = value;
    }
    if let Ok(value) = std::env::var("QUIETCAST_MEDIA_API_SECRET") {
        config.media.api_secret = value;
    }

    Ok(config)
}

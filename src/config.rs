//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\rotation-preview\config.toml
//! - macOS: ~/Library/Application Support/rotation-preview/config.toml
//! - Linux: ~/.config/rotation-preview/config.toml
//!
//! Command-line flags and environment variables override file values (see
//! [`Credentials::merge`]).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::history::{DEFAULT_LIMIT, DEFAULT_PERIOD};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API credentials for the catalog and listening history
    pub credentials: Credentials,

    /// HTTP service settings
    pub server: ServerConfig,

    /// Listening history query
    pub history: HistoryConfig,

    /// Preview playback settings
    pub preview: PreviewConfig,
}

/// API credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub lastfm_api_key: Option<String>,
    pub lastfm_username: Option<String>,
}

impl Credentials {
    /// Overlay non-empty values from `other` onto `self`.
    pub fn merge(mut self, other: Credentials) -> Self {
        fn pick(current: &mut Option<String>, over: Option<String>) {
            if let Some(v) = over.filter(|v| !v.trim().is_empty()) {
                *current = Some(v);
            }
        }
        pick(&mut self.spotify_client_id, other.spotify_client_id);
        pick(&mut self.spotify_client_secret, other.spotify_client_secret);
        pick(&mut self.lastfm_api_key, other.lastfm_api_key);
        pick(&mut self.lastfm_username, other.lastfm_username);
        self
    }

    pub fn has_catalog(&self) -> bool {
        is_set(&self.spotify_client_id) && is_set(&self.spotify_client_secret)
    }

    pub fn has_history(&self) -> bool {
        is_set(&self.lastfm_api_key) && is_set(&self.lastfm_username)
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

/// Listening history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Reporting period: "7day", "1month", "3month", "6month", "12month", "overall"
    pub period: String,

    /// Number of top albums to fetch
    pub limit: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD.to_string(),
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Preview playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Volume level (0.0 - 1.0)
    pub volume: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { volume: 0.8 }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rotation-preview"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from `path`
///
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Save configuration to `path`
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[credentials]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[history]"));
        assert!(toml.contains("[preview]"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.credentials.spotify_client_id = Some("client-id".to_string());
        config.history.period = "7day".to_string();
        config.preview.volume = 0.5;

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.credentials.spotify_client_id, Some("client-id".to_string()));
        assert_eq!(parsed.history.period, "7day");
        assert_eq!(parsed.preview.volume, 0.5);
        assert_eq!(parsed.server.bind, SocketAddr::from(([127, 0, 0, 1], 3000)));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[credentials]
lastfm_username = "listener"

[server]
bind = "0.0.0.0:8080"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.credentials.lastfm_username, Some("listener".to_string()));
        assert_eq!(config.server.bind.port(), 8080);
        assert_eq!(config.history.period, "1month");
        assert_eq!(config.history.limit, 2);
        assert_eq!(config.preview.volume, 0.8);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.credentials.lastfm_api_key = Some("abc".to_string());
        save_to(&config, &path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = load_from(&path);
        assert_eq!(loaded.credentials.lastfm_api_key, Some("abc".to_string()));
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let config = load_from(&path);
        assert_eq!(config.history.limit, 2);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("absent.toml"));
        assert_eq!(config.credentials, Credentials::default());
    }

    #[test]
    fn test_credentials_merge() {
        let file = Credentials {
            spotify_client_id: Some("file-id".to_string()),
            spotify_client_secret: Some("file-secret".to_string()),
            lastfm_api_key: None,
            lastfm_username: Some("file-user".to_string()),
        };
        let cli = Credentials {
            spotify_client_id: Some("cli-id".to_string()),
            spotify_client_secret: Some("  ".to_string()),
            lastfm_api_key: Some("cli-key".to_string()),
            lastfm_username: None,
        };

        let merged = file.merge(cli);
        assert_eq!(merged.spotify_client_id.as_deref(), Some("cli-id"));
        assert_eq!(merged.spotify_client_secret.as_deref(), Some("file-secret"));
        assert_eq!(merged.lastfm_api_key.as_deref(), Some("cli-key"));
        assert_eq!(merged.lastfm_username.as_deref(), Some("file-user"));
        assert!(merged.has_catalog());
        assert!(merged.has_history());
    }

    #[test]
    fn test_blank_credentials_not_set() {
        let creds = Credentials {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("".to_string()),
            ..Default::default()
        };
        assert!(!creds.has_catalog());
        assert!(!creds.has_history());
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::keywords::{clamp_count, DEFAULT_KEYWORD_COUNT};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked for an API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gemini model identifier
    pub model: String,

    /// API root, overridable for proxies and tests
    pub base_url: String,

    /// Plain API key (environment variables take precedence)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Shell command that prints an API key on stdout, e.g. `pass show gemini`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_command: Option<String>,

    /// How long the key command may run before it is abandoned
    pub key_command_timeout_secs: u64,

    /// Number of suggestions pre-filled in the form
    pub default_count: u8,

    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,

    /// kitty-style color file used to derive badge colors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            key_command: None,
            key_command_timeout_secs: 30,
            default_count: DEFAULT_KEYWORD_COUNT,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 64,
            theme_path: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("keyscout");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`. A missing file is created with defaults,
    /// an unreadable or malformed one falls back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => return Ok(config.normalized()),
                    Err(e) => {
                        tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                        return Ok(AppConfig::default());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config {}: {}", path.display(), e);
                    return Ok(AppConfig::default());
                }
            }
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.clone().normalized())?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// Resolve the API key from the environment first, then the config file
    pub fn env_api_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(self.api_key.clone())
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    fn normalized(mut self) -> Self {
        self.default_count = clamp_count(self.default_count);

        // Empty strings in the file mean "unset"
        if self.api_key.as_ref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            self.api_key = None;
        }
        if self.key_command.as_ref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            self.key_command = None;
        }
        if self.model.trim().is_empty() {
            self.model = DEFAULT_MODEL.to_string();
        }
        if self.base_url.trim().is_empty() {
            self.base_url = DEFAULT_BASE_URL.to_string();
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            model: "gemini-2.5-pro".to_string(),
            key_command: Some("pass show gemini".to_string()),
            default_count: 5,
            top_k: 32,
            ..AppConfig::default()
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.model, deserialized.model);
        assert_eq!(config.key_command, deserialized.key_command);
        assert_eq!(deserialized.default_count, 5);
        assert_eq!(deserialized.top_k, 32);
        assert!(deserialized.api_key.is_none());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_count = 250\nbase_url = \"http://localhost:9000/\"\napi_key = \"\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_count, 20);
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.temperature, 0.7);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [not toml").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}

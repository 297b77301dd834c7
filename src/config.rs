//! Configuration management for aromabot
//!
//! TOML-based configuration with defaults and validation.
//! Location: ~/.aromabot/config.toml (or `--config <path>`)
//!
//! The API credential never lives in the config file. It is read from the
//! process environment, optionally populated from a `.env` file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::SplitPolicy;
use crate::errors::{RagError, Result};

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Complete configuration for aromabot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub repl: ReplSettings,
}

/// Hosted model provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_base: String,
    pub embedding_model: String,
    /// Shortened vector length requested from the API; model default if unset
    pub embedding_dimensions: Option<usize>,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Corpus and index locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub source_path: PathBuf,
    pub index_dir: PathBuf,
    pub top_k: usize,
    pub split: SplitPolicy,
}

/// Interactive session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReplSettings {
    pub history_file: Option<PathBuf>,
    pub show_sources: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: None,
            chat_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 30,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("restaurant_data.txt"),
            index_dir: PathBuf::from("restaurant_index"),
            top_k: 4,
            split: SplitPolicy::WholeDocument,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(RagError::Configuration(format!(
                    "config file {} does not exist",
                    config_path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| RagError::Configuration(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| RagError::Configuration(format!("failed to serialize config: {}", e)))
    }

    /// Default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".aromabot").join("config.toml"))
    }

    /// Default REPL history path
    pub fn default_history_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".aromabot_history")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.index.top_k == 0 {
            return Err(RagError::Configuration(
                "index.top_k must be greater than zero".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(RagError::Configuration(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(RagError::Configuration(format!(
                "provider.temperature must be within [0, 2], got {}",
                self.provider.temperature
            )));
        }
        if self.provider.embedding_dimensions == Some(0) {
            return Err(RagError::Configuration(
                "provider.embedding_dimensions must be greater than zero".to_string(),
            ));
        }
        if self.provider.api_base.trim().is_empty() {
            return Err(RagError::Configuration(
                "provider.api_base must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Secret API credential
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Wrap an explicit key; blank keys are rejected
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(RagError::Configuration(format!(
                "{} is empty. Set it in your environment or .env file",
                API_KEY_ENV
            )));
        }
        Ok(Self(key))
    }

    /// Read the credential from the process environment.
    ///
    /// Call [`load_dotenv`] first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) => Self::new(key),
            Err(_) => Err(RagError::Configuration(format!(
                "{} not found. Set it in your environment or .env file",
                API_KEY_ENV
            ))),
        }
    }

    /// Raw secret, for request headers only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form for display
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(3).collect();
        format!("{}****", visible)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"****").finish()
    }
}

/// Populate the environment from the nearest `.env` in the current
/// directory or its ancestors. Existing variables win. A file that exists
/// but cannot be parsed is an error.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    let cwd = std::env::current_dir()?;
    for dir in cwd.ancestors() {
        let path = dir.join(".env");
        if load_dotenv_from(&path)? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Load one `.env` file. Returns false when it does not exist.
pub fn load_dotenv_from(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded .env");
            Ok(true)
        }
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(dotenv_error(e)),
    }
}

fn dotenv_error(e: dotenvy::Error) -> RagError {
    RagError::Configuration(format!("failed to read .env file: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.index.top_k, 4);
        assert_eq!(config.provider.chat_model, "gpt-4o-mini");
        assert_eq!(config.provider.temperature, 0.0);
        assert_eq!(config.index.index_dir, PathBuf::from("restaurant_index"));
        assert_eq!(config.index.split, SplitPolicy::WholeDocument);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [index]
            top_k = 2
            split = "paragraphs"
            "#,
        )
        .unwrap();
        assert_eq!(config.index.top_k, 2);
        assert_eq!(config.index.split, SplitPolicy::Paragraphs);
        assert_eq!(config.index.source_path, PathBuf::from("restaurant_data.txt"));
        assert_eq!(config.provider, ProviderConfig::default());
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let err = Config::from_toml("[index]\ntop_k = 0\n").unwrap_err();
        assert_eq!(err.category(), "ConfigurationError");
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let err = Config::from_toml("[provider]\ntemperature = 3.5\n").unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(Config::from_toml("[index\ntop_k = ").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.provider.chat_model = "gpt-4o".to_string();

        let toml_string = config.to_toml().unwrap();
        assert!(toml_string.contains("gpt-4o"));

        let deserialized = Config::from_toml(&toml_string).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[repl]\nshow_sources = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.repl.show_sources);
    }

    #[test]
    fn test_embedding_dimensions_parsed_and_validated() {
        let config = Config::from_toml("[provider]\nembedding_dimensions = 512\n").unwrap();
        assert_eq!(config.provider.embedding_dimensions, Some(512));
        assert!(Config::default().provider.embedding_dimensions.is_none());

        let err = Config::from_toml("[provider]\nembedding_dimensions = 0\n").unwrap_err();
        assert_eq!(err.category(), "ConfigurationError");
    }

    #[test]
    fn test_dotenv_missing_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!load_dotenv_from(&temp_dir.path().join(".env")).unwrap());
    }

    #[test]
    fn test_dotenv_malformed_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "AROMABOT MALFORMED LINE\n").unwrap();

        let err = load_dotenv_from(&path).unwrap_err();
        assert_eq!(err.category(), "ConfigurationError");
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_dotenv_sets_variables() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "AROMABOT_DOTENV_TEST=loaded\n").unwrap();

        assert!(load_dotenv_from(&path).unwrap());
        assert_eq!(std::env::var("AROMABOT_DOTENV_TEST").unwrap(), "loaded");
    }

    #[test]
    fn test_credential_rejects_blank() {
        let err = Credential::new("   ").unwrap_err();
        assert_eq!(err.category(), "ConfigurationError");
    }

    #[test]
    fn test_credential_debug_is_masked() {
        let cred = Credential::new("sk-secret-value").unwrap();
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("secret"));
        assert_eq!(cred.masked(), "sk-****");
        assert_eq!(cred.expose(), "sk-secret-value");
    }
}

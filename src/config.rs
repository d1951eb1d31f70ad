//! Configuration management for the fanqie scraper.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "Fanqie";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Placeholder value for unconfigured API keys.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Placeholder substituted with the target language in translation prompts.
pub const LANGUAGE_PLACEHOLDER: &str = "{language}";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Translation API configuration.
    pub api: ApiConfig,

    /// Translation behavior settings.
    pub translation: TranslationConfig,

    /// Web scraping settings.
    pub scraping: ScrapingConfig,

    /// File paths.
    pub paths: PathsConfig,
}

/// API configuration for LLM endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key (required for translation).
    pub key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: API_KEY_PLACEHOLDER.to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

impl ApiConfig {
    /// Checks if the API key is configured (not placeholder).
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && self.key != API_KEY_PLACEHOLDER
    }
}

/// Translation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Maximum characters per translation chunk.
    pub chunk_size_chars: usize,

    /// Number of attempts for each chunk.
    pub retries: u32,

    /// Delay between API requests in seconds.
    pub delay_between_requests_sec: f64,

    /// Number of message pairs to retain in conversation history.
    pub history_length: usize,

    /// System prompt. `{language}` is replaced with the target language.
    pub prompt: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            chunk_size_chars: 4000,
            retries: 3,
            delay_between_requests_sec: 1.0,
            history_length: 5,
            prompt: "You are a translator specializing in Chinese web novels. Translate the following text into {language}. Keep one output line per input line and reply with the translation only.".to_string(),
        }
    }
}

impl TranslationConfig {
    /// Returns the system prompt for a target language.
    pub fn prompt_for(&self, language: &str) -> String {
        self.prompt.replace(LANGUAGE_PLACEHOLDER, language)
    }
}

/// Web scraping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Delay between web requests in seconds.
    pub delay_between_requests_sec: f64,
    /// Enable scraper debug logging.
    pub debug: bool,
    /// Site origin used to resolve relative links.
    pub base_url: String,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            delay_between_requests_sec: 1.0,
            debug: false,
            base_url: "https://fanqienovel.com".to_string(),
        }
    }
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for scraped and translated documents.
    pub output_directory: PathBuf,

    /// Glyph remap data file.
    pub mapping_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("output"),
            mapping_file: PathBuf::from("mapping.json"),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the settings the scraper depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_delay(
            "scraping.delay_between_requests_sec",
            self.scraping.delay_between_requests_sec,
        )?;
        validate_delay(
            "translation.delay_between_requests_sec",
            self.translation.delay_between_requests_sec,
        )?;

        if url::Url::parse(&self.scraping.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "scraping.base_url".to_string(),
                message: format!("'{}' is not a valid URL", self.scraping.base_url),
            });
        }

        Ok(())
    }

    /// Validates the settings required for translation.
    pub fn validate_for_translation(&self) -> Result<(), ConfigError> {
        self.validate()?;

        if !self.api.is_configured() {
            return Err(ConfigError::MissingValue(
                "api.key (set your API key in config file, --api-key or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        if self.translation.chunk_size_chars == 0 {
            return Err(ConfigError::InvalidValue {
                key: "translation.chunk_size_chars".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.translation.retries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "translation.retries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Delays are turned into `Duration`s, which need a finite, non-negative value.
fn validate_delay(key: &str, seconds: f64) -> Result<(), ConfigError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be a finite number of seconds >= 0, got {}", seconds),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.api.is_configured());
        assert_eq!(config.translation.chunk_size_chars, 4000);
        assert_eq!(config.scraping.delay_between_requests_sec, 1.0);
        assert_eq!(config.scraping.base_url, "https://fanqienovel.com");
        assert_eq!(config.paths.mapping_file, PathBuf::from("mapping.json"));
    }

    #[test]
    fn test_api_configured_check() {
        let mut api = ApiConfig::default();
        assert!(!api.is_configured());

        api.key = "sk-real-key".to_string();
        assert!(api.is_configured());

        api.key = String::new();
        assert!(!api.is_configured());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = Config::default();
        config.scraping.debug = true;
        let file = NamedTempFile::new().unwrap();

        config.save_to(file.path()).unwrap();

        let loaded = Config::load_from(file.path()).unwrap();
        assert_eq!(loaded.api.model, config.api.model);
        assert!(loaded.scraping.debug);
        assert_eq!(loaded.paths.output_directory, config.paths.output_directory);
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.translation.retries, 3);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[api]\nkey = \"sk-test\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.api.is_configured());
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert_eq!(config.scraping.delay_between_requests_sec, 1.0);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[api\nkey = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.validate_for_translation().is_err());

        let mut config = Config::default();
        config.api.key = "real-key".to_string();
        assert!(config.validate_for_translation().is_ok());

        config.translation.chunk_size_chars = 0;
        assert!(config.validate_for_translation().is_err());

        let mut config = Config::default();
        config.scraping.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_delays_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[scraping]\ndelay_between_requests_sec = inf\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.scraping.delay_between_requests_sec.is_infinite());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "scraping.delay_between_requests_sec"
        ));

        let mut config = Config::default();
        config.scraping.delay_between_requests_sec = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scraping.delay_between_requests_sec = -1.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.translation.delay_between_requests_sec = f64::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "translation.delay_between_requests_sec"
        ));

        let mut config = Config::default();
        config.scraping.delay_between_requests_sec = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prompt_for_language() {
        let config = TranslationConfig::default();
        let prompt = config.prompt_for("English");
        assert!(prompt.contains("into English"));
        assert!(!prompt.contains(LANGUAGE_PLACEHOLDER));
    }
}

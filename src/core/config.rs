//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - LLM provider, model and whether AI is enabled
//! - Moai personality selection
//! - Commit suggestion defaults

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::ai::personality::DEFAULT_PERSONALITY;
use crate::error::{NoideaError, Result};

/// Environment variable names that override the config file
pub mod env {
    pub const LLM_ENABLED: &str = "NOIDEA_LLM_ENABLED";
    pub const PROVIDER: &str = "NOIDEA_PROVIDER";
    pub const MODEL: &str = "NOIDEA_MODEL";
    pub const PERSONALITY: &str = "NOIDEA_PERSONALITY";
    pub const BASE_URL: &str = "NOIDEA_BASE_URL";
}

/// LLM settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Use the model for moai feedback without passing `--ai`
    pub enabled: bool,
    pub provider: String,
    /// Empty selects the provider's default model
    pub model: String,
    /// Overrides the provider's endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: String::new(),
            base_url: None,
        }
    }
}

/// Moai feedback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoaiConfig {
    pub personality: String,
    /// TOML file with extra personalities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_file: Option<PathBuf>,
}

impl Default for MoaiConfig {
    fn default() -> Self {
        Self {
            personality: DEFAULT_PERSONALITY.to_string(),
            personality_file: None,
        }
    }
}

/// Commit suggestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Number of recent commit messages sent as context
    pub history: usize,
    /// Send the full diff instead of a truncated one
    pub full_diff: bool,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            history: 10,
            full_diff: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub moai: MoaiConfig,

    #[serde(default)]
    pub suggest: SuggestConfig,
}

/// Keys accepted by `noidea config set|get|remove`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// Stored in the keyring, not the config file
    ApiKey,
    Provider,
    Model,
    Personality,
    AiEnabled,
}

impl ConfigKey {
    pub fn parse(key: &str) -> Result<Self> {
        match key.trim().to_lowercase().replace('_', "-").as_str() {
            "api-key" => Ok(ConfigKey::ApiKey),
            "provider" => Ok(ConfigKey::Provider),
            "model" => Ok(ConfigKey::Model),
            "personality" => Ok(ConfigKey::Personality),
            "ai-enabled" => Ok(ConfigKey::AiEnabled),
            other => Err(NoideaError::InvalidInput(format!(
                "Unknown config key '{}'. Valid keys: {}",
                other,
                Self::names().join(", ")
            ))),
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["api-key", "provider", "model", "personality", "ai-enabled"]
    }
}

impl Config {
    /// Load configuration from file with environment overrides applied
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from the file only, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    ///
    /// Loads the file fresh before writing when called through the CLI, so
    /// environment overrides never end up persisted.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Apply `NOIDEA_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(env::LLM_ENABLED) {
            match parse_bool(&value) {
                Some(enabled) => self.llm.enabled = enabled,
                None => tracing::warn!("Ignoring invalid {}={}", env::LLM_ENABLED, value),
            }
        }
        if let Some(provider) = lookup(env::PROVIDER).filter(|v| !v.trim().is_empty()) {
            self.llm.provider = provider.trim().to_string();
        }
        if let Some(model) = lookup(env::MODEL) {
            self.llm.model = model.trim().to_string();
        }
        if let Some(personality) = lookup(env::PERSONALITY).filter(|v| !v.trim().is_empty()) {
            self.moai.personality = personality.trim().to_string();
        }
        if let Some(base_url) = lookup(env::BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.llm.base_url = Some(base_url.trim().to_string());
        }
    }

    /// Current value of a file-backed key
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::ApiKey => None,
            ConfigKey::Provider => Some(self.llm.provider.clone()),
            ConfigKey::Model => Some(self.llm.model.clone()).filter(|m| !m.is_empty()),
            ConfigKey::Personality => Some(self.moai.personality.clone()),
            ConfigKey::AiEnabled => Some(self.llm.enabled.to_string()),
        }
    }

    /// Set a file-backed key
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            ConfigKey::ApiKey => {
                return Err(NoideaError::Config(
                    "API keys are stored in the system keyring, not the config file".into(),
                ))
            }
            ConfigKey::Provider => self.llm.provider = value.to_lowercase(),
            ConfigKey::Model => self.llm.model = value.to_string(),
            ConfigKey::Personality => self.moai.personality = value.to_string(),
            ConfigKey::AiEnabled => {
                self.llm.enabled = parse_bool(value).ok_or_else(|| {
                    NoideaError::InvalidInput(format!(
                        "Expected true or false for ai-enabled, got '{}'",
                        value
                    ))
                })?
            }
        }
        Ok(())
    }

    /// Reset a file-backed key to its default
    pub fn remove(&mut self, key: ConfigKey) {
        let defaults = Config::default();
        match key {
            ConfigKey::ApiKey => {}
            ConfigKey::Provider => self.llm.provider = defaults.llm.provider,
            ConfigKey::Model => self.llm.model = defaults.llm.model,
            ConfigKey::Personality => self.moai.personality = defaults.moai.personality,
            ConfigKey::AiEnabled => self.llm.enabled = defaults.llm.enabled,
        }
    }

    /// Model to request, or `None` for the provider default
    pub fn model(&self) -> Option<&str> {
        Some(self.llm.model.as_str()).filter(|m| !m.trim().is_empty())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "noidea", "noidea")
            .ok_or_else(|| NoideaError::Config("Could not determine config directory".into()))?;

        Ok(project_dirs.config_dir().to_path_buf())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.llm.enabled);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.model(), None);
        assert_eq!(config.moai.personality, "snarky_reviewer");
        assert_eq!(config.suggest.history, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[llm]\nprovider = \"xai\"\n").unwrap();
        assert_eq!(config.llm.provider, "xai");
        assert!(!config.llm.enabled);
        assert_eq!(config.moai, MoaiConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set(ConfigKey::AiEnabled, "yes").unwrap();
        config.set(ConfigKey::Model, "grok-beta").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(loaded.llm.enabled);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (env::LLM_ENABLED, "true"),
            (env::PROVIDER, "deepseek"),
            (env::MODEL, "deepseek-coder"),
            (env::PERSONALITY, "git_expert"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert!(config.llm.enabled);
        assert_eq!(config.llm.provider, "deepseek");
        assert_eq!(config.model(), Some("deepseek-coder"));
        assert_eq!(config.moai.personality, "git_expert");
    }

    #[test]
    fn test_invalid_env_bool_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|name| (name == env::LLM_ENABLED).then(|| "maybe".to_string()));
        assert!(!config.llm.enabled);
    }

    #[test]
    fn test_config_keys() {
        assert_eq!(ConfigKey::parse("api_key").unwrap(), ConfigKey::ApiKey);
        assert_eq!(ConfigKey::parse("AI-Enabled").unwrap(), ConfigKey::AiEnabled);
        assert!(ConfigKey::parse("colour").is_err());

        let mut config = Config::default();
        assert!(config.set(ConfigKey::ApiKey, "x").is_err());
        assert!(config.set(ConfigKey::AiEnabled, "maybe").is_err());
        config.set(ConfigKey::Provider, "XAI").unwrap();
        assert_eq!(config.get(ConfigKey::Provider).as_deref(), Some("xai"));
        config.remove(ConfigKey::Provider);
        assert_eq!(config.get(ConfigKey::Provider).as_deref(), Some("openai"));
    }
}

//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::summary::input::DEFAULT_MAX_INPUT_CHARS;
use crate::summary::{SummarizationMode, MAX_CUSTOM_INSTRUCTION_CHARS};
use crate::BrieflyError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// LLM provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Summarization preferences
    #[serde(default)]
    pub summary: SummarySettings,

    /// Translation preferences
    #[serde(default)]
    pub translation: TranslationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// LLM provider (gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint (empty = provider default)
    #[serde(default)]
    pub endpoint: String,

    /// Seconds to wait for the provider before giving up
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Mode used when none is given on the command line
    #[serde(default)]
    pub default_mode: SummarizationMode,

    /// Instruction used by the `customize` mode
    #[serde(default)]
    pub custom_prompt: String,

    /// Input is truncated to this many characters (0 = no limit)
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// Translate results after summarizing
    #[serde(default)]
    pub enabled: bool,

    /// Language of the summarized content
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language to translate into
    #[serde(default)]
    pub target_language: String,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}

fn default_llm_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_source_language() -> String {
    "en".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            default_mode: SummarizationMode::default(),
            custom_prompt: String::new(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            source_language: default_source_language(),
            target_language: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides();
            return Ok(settings);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut settings = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Parse settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if self.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("BRIEFLY_GEMINI_API_KEY") {
                if !key.trim().is_empty() {
                    self.llm.api_key = key;
                }
            }
        }
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(BrieflyError::Config(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let prompt_len = self.summary.custom_prompt.chars().count();
        if prompt_len > MAX_CUSTOM_INSTRUCTION_CHARS {
            return Err(BrieflyError::Config(format!(
                "summary.custom_prompt is {} characters, limit is {}",
                prompt_len, MAX_CUSTOM_INSTRUCTION_CHARS
            )));
        }

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "briefly", "briefly")
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &PathBuf) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Provider deadline
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs)
    }

    /// Custom instruction, if one is configured
    pub fn custom_prompt(&self) -> Option<String> {
        let prompt = self.summary.custom_prompt.trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    }

    /// Get the Unix socket path for IPC
    pub fn socket_path(&self) -> PathBuf {
        runtime_dir().join("briefly.sock")
    }

    /// Get the PID file path
    pub fn pid_path(&self) -> PathBuf {
        runtime_dir().join("briefly.pid")
    }
}

fn runtime_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gemini-1.5-flash");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.summary.default_mode, SummarizationMode::Brief);
        assert_eq!(settings.summary.max_input_chars, 10_000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings = Settings::from_toml(
            r#"
[summary]
default_mode = "bullet_points"
custom_prompt = "  Explain like I'm five  "
"#,
        )
        .unwrap();

        assert_eq!(settings.summary.default_mode, SummarizationMode::BulletPoints);
        assert_eq!(settings.custom_prompt().as_deref(), Some("Explain like I'm five"));
        assert_eq!(settings.llm.provider, "gemini");
        assert_eq!(settings.translation.source_language, "en");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Settings::default()).unwrap();
        let parsed = Settings::from_toml(&text).unwrap();
        assert_eq!(parsed.llm.timeout_secs, 30);
        assert!(text.contains("[summary]"));
    }

    #[test]
    fn validate_rejects_zero_timeout_and_long_prompt() {
        let mut settings = Settings::default();
        settings.llm.timeout_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.summary.custom_prompt = "x".repeat(MAX_CUSTOM_INSTRUCTION_CHARS + 1);
        let err = settings.validate().unwrap_err().to_string();
        assert!(err.contains("summary.custom_prompt"));
    }

    #[test]
    fn blank_custom_prompt_is_none() {
        let settings = Settings::default();
        assert_eq!(settings.custom_prompt(), None);
    }
}

//! Configuration management for bpm-lifecycle.
//!
//! Handles loading configuration from TOML files. The loaded [`Config`] is
//! passed explicitly to every component that needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".bpm-lifecycle.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language model settings
    pub llm: LlmConfig,

    /// Output and export settings
    pub output: OutputConfig,
}

/// Language model client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum completion tokens (provider default when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Retries on transient failures (0 = fail fast)
    pub max_retries: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Environment variable holding the API key
    pub api_key_env: String,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print the raw prompt sent for each stage
    pub show_prompts: bool,

    /// Print the generated BPMN XML
    pub show_xml: bool,

    /// Write a `.dot` file next to every exported `.bpmn` file
    pub write_diagrams: bool,

    /// Directory to export process definitions into
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.bpm-lifecycle.toml` in current directory
    /// 2. `~/.config/bpm-lifecycle/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_file) = Self::config_file() {
            if config_file.exists() {
                return Self::load_from_file(&config_file);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("bpm-lifecycle"))
    }

    /// Get the global config file path.
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }
}

impl LlmConfig {
    /// Retry policy for API calls derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy { max_retries: self.max_retries, ..RetryPolicy::api() }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.1,
            max_tokens: None,
            max_retries: 3,
            timeout_secs: 120,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { show_prompts: false, show_xml: false, write_diagrams: true, dir: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert!(!config.output.show_prompts);
        assert!(config.output.write_diagrams);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[output]"));
        assert!(!toml_str.contains("max_tokens"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [llm]
            model = "gpt-4-turbo"
            max_retries = 0
            max_tokens = 2048

            [output]
            show_xml = true
            dir = "exports"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.model, "gpt-4-turbo");
        assert_eq!(config.llm.max_retries, 0);
        assert_eq!(config.llm.max_tokens, Some(2048));
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert!(config.output.show_xml);
        assert_eq!(config.output.dir, Some(PathBuf::from("exports")));
    }

    #[test]
    fn test_retry_policy_follows_config() {
        let llm = LlmConfig { max_retries: 1, ..LlmConfig::default() };
        assert_eq!(llm.retry_policy().max_retries, 1);
        assert_eq!(llm.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm]\ntemperature = 0.5\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert!((config.llm.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[llm\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config"));
    }
}

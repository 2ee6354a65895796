//! Configuration loading, validation and management for errand.
//!
//! Loads configuration from `~/.errand/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use errand_core::{AgentLimits, AgentSettings, VerificationMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.errand/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model for planned tasks (defaults to `default_model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_model: Option<String>,

    /// Model for batch summaries (defaults to the agent model)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per completion
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Loop limits
    #[serde(default)]
    pub limits: AgentLimits,

    /// Planner behavior
    #[serde(default)]
    pub agent: AgentConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Smallest plan budget that still sends a correction for each of three
/// malformed plans.
const MIN_PLAN_ATTEMPTS: u32 = 4;

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("agent_model", &self.agent_model)
            .field("summary_model", &self.summary_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("limits", &self.limits)
            .field("agent", &self.agent)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// `[agent]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// How verification and amendment replies are read: "loose" or "strict"
    #[serde(default)]
    pub verification: VerificationMode,

    /// Replace the built-in dispatch system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

/// `[providers.<name>]` section.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.errand/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `ERRAND_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `OPENROUTER_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("ERRAND_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(provider) = lookup("ERRAND_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("ERRAND_MODEL") {
            self.default_model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".errand")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.default_max_tokens == 0 {
            return Err(ConfigError::ValidationError("default_max_tokens must be > 0".into()));
        }

        let limits = [
            ("max_attempts", self.limits.max_attempts),
            ("max_tool_rounds", self.limits.max_tool_rounds),
            ("max_plan_attempts", self.limits.max_plan_attempts),
            ("max_step_attempts", self.limits.max_step_attempts),
            ("max_summary_attempts", self.limits.max_summary_attempts),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::ValidationError(format!("limits.{name} must be >= 1")));
        }

        // Three malformed plans must each get their own correction.
        if self.limits.max_plan_attempts < MIN_PLAN_ATTEMPTS {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_plan_attempts must be >= {MIN_PLAN_ATTEMPTS}"
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Settings for planned tasks: `agent_model` if set, else `default_model`.
    pub fn agent_settings(&self) -> AgentSettings {
        let model = self.agent_model.clone().unwrap_or_else(|| self.default_model.clone());
        self.settings_for(model)
    }

    /// Settings for chat turns, which always use `default_model`.
    pub fn chat_settings(&self) -> AgentSettings {
        self.settings_for(self.default_model.clone())
    }

    fn settings_for(&self, model: String) -> AgentSettings {
        AgentSettings {
            model,
            summary_model: self.summary_model.clone(),
            temperature: self.default_temperature,
            max_tokens: Some(self.default_max_tokens),
            limits: self.limits,
            verification: self.agent.verification,
            system_prompt_override: self.agent.system_prompt_override.clone(),
        }
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            agent_model: None,
            summary_model: None,
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            limits: AgentLimits::default(),
            agent: AgentConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.limits.max_attempts, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.limits, config.limits);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_attempt_limit_rejected() {
        let mut config = AppConfig::default();
        config.limits.max_plan_attempts = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_plan_attempts"));
    }

    #[test]
    fn plan_budget_below_four_rejected() {
        let mut config = AppConfig::default();
        config.limits.max_plan_attempts = 3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_plan_attempts must be >= 4"));

        config.limits.max_plan_attempts = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn chat_uses_default_model_and_tasks_use_agent_model() {
        let config = AppConfig {
            default_model: "gpt-4o-mini".into(),
            agent_model: Some("gpt-4o".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.chat_settings().model, "gpt-4o-mini");
        assert_eq!(config.agent_settings().model, "gpt-4o");
        assert_eq!(config.chat_settings().limits, config.agent_settings().limits);
    }

    #[test]
    fn zero_replans_allowed() {
        let mut config = AppConfig::default();
        config.limits.max_replans = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
    }

    #[test]
    fn load_sections_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
default_provider = "openrouter"
default_model = "openai/gpt-4o"
summary_model = "openai/gpt-4o-mini"

[limits]
max_replans = 1
max_tool_rounds = 8

[agent]
verification = "strict"

[providers.openrouter]
api_key = "sk-or-test"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.default_provider, "openrouter");
        assert_eq!(config.limits.max_replans, 1);
        assert_eq!(config.limits.max_tool_rounds, 8);
        assert_eq!(config.limits.max_attempts, 4);
        assert_eq!(config.agent.verification, VerificationMode::Strict);
        assert!(config.has_api_key());

        let settings = config.agent_settings();
        assert_eq!(settings.model, "openai/gpt-4o");
        assert_eq!(settings.summary_model(), "openai/gpt-4o-mini");
        assert_eq!(settings.verification, VerificationMode::Strict);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "default_model = [").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_follow_priority() {
        let mut config = AppConfig::default();
        config.apply_env(|key| match key {
            "OPENAI_API_KEY" => Some("sk-openai".into()),
            "OPENROUTER_API_KEY" => Some("sk-or".into()),
            "ERRAND_MODEL" => Some("gpt-4o".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn file_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|key| (key == "ERRAND_API_KEY").then(|| "from-env".into()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_redacts_keys() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o-mini"));
        assert!(toml_str.contains("max_tool_rounds"));
        assert!(toml_str.contains("verification"));
    }
}

//! Agent settings: model choice, loop limits and verification mode.

use serde::{Deserialize, Serialize};

/// Settings shared by the dispatch loop, the planner and the batch runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model used for dispatch turns and planning
    pub model: String,

    /// Model used for batch summaries (defaults to `model`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_model: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temp")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub limits: AgentLimits,

    #[serde(default)]
    pub verification: VerificationMode,

    /// Replaces the built-in dispatch system prompt when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

impl AgentSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            summary_model: None,
            temperature: default_temp(),
            max_tokens: None,
            limits: AgentLimits::default(),
            verification: VerificationMode::default(),
            system_prompt_override: None,
        }
    }

    pub fn summary_model(&self) -> &str {
        self.summary_model.as_deref().unwrap_or(&self.model)
    }
}

fn default_temp() -> f32 {
    0.7
}

/// Upper bounds on every loop the agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLimits {
    /// Outer retries of one user turn
    pub max_attempts: u32,
    /// Tool call → result rounds within one attempt
    pub max_tool_rounds: u32,
    /// Plan requests before giving up on a parseable plan. The last request
    /// gets no correction, so N requests send N - 1 corrections.
    pub max_plan_attempts: u32,
    /// Execute/verify cycles per plan step
    pub max_step_attempts: u32,
    /// Plan amendments per task
    pub max_replans: u32,
    /// Correction retries per batch summary
    pub max_summary_attempts: u32,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            max_tool_rounds: 25,
            max_plan_attempts: 5,
            max_step_attempts: 5,
            max_replans: 3,
            max_summary_attempts: 3,
        }
    }
}

/// How a yes/no reply from the model is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// "yes" anywhere in the reply, any case
    #[default]
    Loose,
    /// The whole reply must be "yes", ignoring case and trailing punctuation
    Strict,
}

impl VerificationMode {
    pub fn is_affirmative(&self, reply: &str) -> bool {
        match self {
            Self::Loose => reply.to_lowercase().contains("yes"),
            Self::Strict => reply
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_punctuation())
                .eq_ignore_ascii_case("yes"),
        }
    }
}

impl std::str::FromStr for VerificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loose" => Ok(Self::Loose),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown verification mode '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let limits = AgentLimits::default();
        assert_eq!(limits.max_attempts, 4);
        assert_eq!(limits.max_tool_rounds, 25);
        assert_eq!(limits.max_replans, 3);
    }

    #[test]
    fn loose_mode_matches_substring() {
        let mode = VerificationMode::Loose;
        assert!(mode.is_affirmative("Yes, the step is done."));
        assert!(mode.is_affirmative("I'd say YES"));
        assert!(!mode.is_affirmative("No."));
    }

    #[test]
    fn strict_mode_needs_bare_yes() {
        let mode = VerificationMode::Strict;
        assert!(mode.is_affirmative(" Yes. "));
        assert!(mode.is_affirmative("yes!"));
        assert!(!mode.is_affirmative("Yes, but the data was incomplete"));
        assert!(!mode.is_affirmative("yesterday"));
    }

    #[test]
    fn summary_model_falls_back() {
        let mut settings = AgentSettings::new("gpt-4o-mini");
        assert_eq!(settings.summary_model(), "gpt-4o-mini");
        settings.summary_model = Some("gpt-3.5-turbo".into());
        assert_eq!(settings.summary_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn partial_limits_deserialize_with_defaults() {
        let limits: AgentLimits = serde_json::from_str(r#"{"max_replans": 1}"#).unwrap();
        assert_eq!(limits.max_replans, 1);
        assert_eq!(limits.max_attempts, 4);
    }
}

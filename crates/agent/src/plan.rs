//! Plan parsing from model replies.
//!
//! A plan is a JSON object `{"steps": [...]}`. The reply may wrap it in a
//! Markdown code fence (` ```json ` or bare ` ``` `); anything else around the
//! object makes the reply invalid and the planner asks again.

use serde::{Deserialize, Serialize};

/// An ordered list of natural-language steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<String>,
}

/// Why a reply could not be read as a plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanParseError {
    #[error("the reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("the JSON has no \"steps\" list")]
    MissingSteps,

    #[error("step {0} is not a non-empty string")]
    InvalidStep(usize),

    #[error("the plan has no steps")]
    Empty,
}

impl Plan {
    /// Parse a plan from model reply text.
    pub fn parse(reply: &str) -> Result<Self, PlanParseError> {
        let body = strip_code_fence(reply);
        let json: serde_json::Value =
            serde_json::from_str(body).map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;

        let steps = json
            .get("steps")
            .and_then(|v| v.as_array())
            .ok_or(PlanParseError::MissingSteps)?;

        if steps.is_empty() {
            return Err(PlanParseError::Empty);
        }

        let steps = steps
            .iter()
            .enumerate()
            .map(|(i, step)| match step {
                serde_json::Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                _ => Err(PlanParseError::InvalidStep(i + 1)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Return the contents of a surrounding Markdown code fence, if any.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

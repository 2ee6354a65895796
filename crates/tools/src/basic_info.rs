//! Basic information tool: current time, date and the user's location.

use async_trait::async_trait;
use chrono::Local;
use errand_core::error::ToolError;
use errand_core::tool::{ParamDecl, Tool, ToolArgs, ToolContext, ToolDoc};

/// Reports the local time and date, plus a fixed location when one is known.
#[derive(Debug, Default)]
pub struct BasicInfoTool {
    location: Option<String>,
}

impl BasicInfoTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(location: impl Into<String>) -> Self {
        Self { location: Some(location.into()) }
    }
}

#[async_trait]
impl Tool for BasicInfoTool {
    fn name(&self) -> &str {
        "get_basic_info"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new(
            "Useful for getting some basic information - the current time, the current date, the current location.",
        )
    }

    fn signature(&self) -> Vec<ParamDecl> {
        Vec::new()
    }

    fn show_progress(&self) -> bool {
        false
    }

    async fn call(&self, _args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let now = Local::now();
        Ok(serde_json::json!({
            "time": now.format("%H:%M").to_string(),
            "date": now.format("%d/%m/%Y").to_string(),
            "location": self.location.as_deref().unwrap_or("unknown"),
        }))
    }
}

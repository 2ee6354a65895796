//! Built-in tool implementations for errand.
//!
//! Tools give the agent its capabilities: weather forecasts, the current
//! time and date, travel distances, number summaries, dataset details and
//! line plots. All of them are deterministic and offline.

pub mod basic_info;
pub mod data_details;
pub mod plot;
pub mod summarize_numbers;
pub mod travel;
pub mod weather;

use errand_core::error::RegistrationError;
use errand_core::tool::{Tool, ToolRegistry};
use std::sync::Arc;

pub use basic_info::BasicInfoTool;
pub use data_details::DataDetailsTool;
pub use plot::PlotDataTool;
pub use summarize_numbers::SummarizeNumbersTool;
pub use travel::TravelDistanceTool;
pub use weather::WeatherTool;

/// Every built-in tool, in registration order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(BasicInfoTool::new()),
        Arc::new(WeatherTool),
        Arc::new(TravelDistanceTool),
        Arc::new(SummarizeNumbersTool),
        Arc::new(DataDetailsTool),
        Arc::new(PlotDataTool),
    ]
}

/// Create a registry with all built-in tools.
pub fn default_registry() -> Result<ToolRegistry, RegistrationError> {
    ToolRegistry::from_tools(builtin_tools())
}

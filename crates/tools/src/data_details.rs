//! Dataset details tool: reads the session's dataset catalog.

use async_trait::async_trait;
use errand_core::error::ToolError;
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc};

pub struct DataDetailsTool;

#[async_trait]
impl Tool for DataDetailsTool {
    fn name(&self) -> &str {
        "get_data_details"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new("Useful for getting the summary, column names and a few sample rows of an uploaded dataset")
            .param("name", "the name of the dataset")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![ParamDecl::required("name", ParamType::String)]
    }

    async fn call(&self, args: ToolArgs, ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let name = args.str("name")?;
        let datasets = ctx.session.datasets();

        match datasets.get(name) {
            Some(details) => serde_json::to_value(details).map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            }),
            None => Ok(serde_json::json!({
                "error": format!("No dataset named '{name}'"),
                "available": datasets.keys().collect::<Vec<_>>(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errand_core::session::{DatasetDetails, MemorySession};
    use errand_core::tool::ToolRegistry;
    use std::sync::Arc;

    fn session() -> MemorySession {
        MemorySession::new().with_dataset(
            "sales",
            DatasetDetails {
                summary: "Monthly sales per region".into(),
                columns: vec!["region".into(), "total".into()],
                sample: serde_json::json!([{"region": "EU", "total": 10}]),
            },
        )
    }

    async fn details(name: &str) -> serde_json::Value {
        let registry =
            ToolRegistry::from_tools([Arc::new(DataDetailsTool) as Arc<dyn Tool>]).unwrap();
        let args = serde_json::json!({"name": name, "reason": "inspecting data"});
        let out = registry
            .invoke("get_data_details", args.as_object().cloned().unwrap(), &session())
            .await
            .unwrap();
        serde_json::from_str(&out).unwrap()
    }

    #[tokio::test]
    async fn known_dataset_returns_columns() {
        let value = details("sales").await;
        assert_eq!(value["columns"], serde_json::json!(["region", "total"]));
    }

    #[tokio::test]
    async fn unknown_dataset_lists_available() {
        let value = details("costs").await;
        assert_eq!(value["available"], serde_json::json!(["sales"]));
    }
}

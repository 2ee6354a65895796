//! Line plots rendered straight to the user.
//!
//! The tool does not draw anything itself: it hands a small chart spec to
//! the session's render sink and tells the model the user has seen it.

use async_trait::async_trait;
use errand_core::error::ToolError;
use errand_core::session::RenderEntry;
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc};

const SHOWN: &str =
    "The data has been plotted and already shown to the user. No additional output is required.";

pub struct PlotDataTool;

#[async_trait]
impl Tool for PlotDataTool {
    fn name(&self) -> &str {
        "plot_data"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new("Useful for plotting data")
            .param("x", "the list of x values")
            .param("y", "the list of y values")
            .param("title", "the title of the plot")
            .param("xlabel", "the label for the x axis")
            .param("ylabel", "the label for the y axis")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("x", ParamType::array(ParamType::Number)),
            ParamDecl::required("y", ParamType::array(ParamType::Number)),
            ParamDecl::required("title", ParamType::String),
            ParamDecl::required("xlabel", ParamType::String),
            ParamDecl::required("ylabel", ParamType::String),
        ]
    }

    async fn call(&self, args: ToolArgs, ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let x = args.f64_list("x")?;
        let y = args.f64_list("y")?;

        if x.len() != y.len() {
            return Ok(serde_json::json!({
                "error": format!("x has {} values but y has {}", x.len(), y.len())
            }));
        }

        let title = args.str("title")?.to_string();
        let spec = serde_json::json!({
            "mark": "line",
            "x": x,
            "y": y,
            "xlabel": args.str("xlabel")?,
            "ylabel": args.str("ylabel")?,
        });

        tracing::debug!(points = x.len(), %title, "Rendering plot");
        ctx.session.render(RenderEntry::Plot { title, spec });

        Ok(serde_json::json!({ "results": SHOWN }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errand_core::session::MemorySession;
    use errand_core::tool::ToolRegistry;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        ToolRegistry::from_tools([Arc::new(PlotDataTool) as Arc<dyn Tool>]).unwrap()
    }

    #[tokio::test]
    async fn plot_is_rendered_to_the_session() {
        let session = MemorySession::new();
        let args = serde_json::json!({
            "x": ["1", 2, 3.5],
            "y": [10, "20.5", 15],
            "title": "Sales",
            "xlabel": "month",
            "ylabel": "total",
            "reason": "plotting sales"
        });
        let out = registry()
            .invoke("plot_data", args.as_object().cloned().unwrap(), &session)
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value["results"].as_str().unwrap().contains("already shown to the user"));

        let rendered = session.rendered();
        assert_eq!(rendered.len(), 1);
        match &rendered[0] {
            RenderEntry::Plot { title, spec } => {
                assert_eq!(title, "Sales");
                assert_eq!(spec["x"], serde_json::json!([1.0, 2.0, 3.5]));
                assert_eq!(spec["y"], serde_json::json!([10.0, 20.5, 15.0]));
                assert_eq!(spec["xlabel"], "month");
            }
            other => panic!("expected a plot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mismatched_lengths_render_nothing() {
        let session = MemorySession::new();
        let args = serde_json::json!({
            "x": [1, 2, 3],
            "y": [1, 2],
            "title": "t",
            "xlabel": "x",
            "ylabel": "y"
        });
        let out = registry()
            .invoke("plot_data", args.as_object().cloned().unwrap(), &session)
            .await
            .unwrap();
        assert!(out.contains("\"error\""));
        assert!(session.rendered().is_empty());
    }

    #[tokio::test]
    async fn malformed_value_is_a_coercion_error() {
        let args = serde_json::json!({
            "x": [1, "two"],
            "y": [1, 2],
            "title": "t",
            "xlabel": "x",
            "ylabel": "y"
        });
        let err = registry()
            .invoke("plot_data", args.as_object().cloned().unwrap(), &MemorySession::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Coercion { ref param, .. } if param == "x[1]"));
    }
}

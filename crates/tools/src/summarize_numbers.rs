//! Descriptive statistics over a list of numbers.

use async_trait::async_trait;
use errand_core::error::ToolError;
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc};

pub struct SummarizeNumbersTool;

#[async_trait]
impl Tool for SummarizeNumbersTool {
    fn name(&self) -> &str {
        "summarize_numbers"
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new("Useful for computing the count, sum, mean, median, minimum and maximum of a list of numbers")
            .param("values", "the numbers to summarize")
            .param("decimals", "how many decimal places to round results to. Defaults to 2.")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("values", ParamType::array(ParamType::Number)),
            ParamDecl::optional("decimals", ParamType::Integer),
        ]
    }

    async fn call(&self, args: ToolArgs, _ctx: &ToolContext<'_>) -> Result<serde_json::Value, ToolError> {
        let mut values = args.f64_list("values")?;
        let decimals = args.opt_i64("decimals").unwrap_or(2).clamp(0, 10) as i32;

        if values.is_empty() {
            return Ok(serde_json::json!({ "error": "Cannot summarize an empty list" }));
        }

        values.sort_by(f64::total_cmp);
        let count = values.len();
        let sum: f64 = values.iter().sum();
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };

        let scale = 10f64.powi(decimals);
        let round = |v: f64| (v * scale).round() / scale;

        Ok(serde_json::json!({
            "count": count,
            "sum": round(sum),
            "mean": round(sum / count as f64),
            "median": round(median),
            "min": round(values[0]),
            "max": round(values[count - 1]),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errand_core::session::NullSession;
    use errand_core::tool::ToolRegistry;
    use std::sync::Arc;

    async fn summarize(args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let registry =
            ToolRegistry::from_tools([Arc::new(SummarizeNumbersTool) as Arc<dyn Tool>]).unwrap();
        let out = registry
            .invoke("summarize_numbers", args.as_object().cloned().unwrap(), &NullSession)
            .await?;
        Ok(serde_json::from_str(&out).unwrap())
    }

    #[tokio::test]
    async fn mixed_numeric_strings_are_coerced() {
        let value = summarize(serde_json::json!({
            "values": [3, "1", 2.5, "4"], "reason": "summarizing"
        }))
        .await
        .unwrap();
        assert_eq!(value["count"], 4);
        assert_eq!(value["sum"], 10.5);
        assert_eq!(value["median"], 2.75);
        assert_eq!(value["min"], 1.0);
    }

    #[tokio::test]
    async fn malformed_element_is_a_coercion_error() {
        let err = summarize(serde_json::json!({
            "values": [1, "lots"], "reason": "summarizing"
        }))
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Coercion { .. }));
    }

    #[tokio::test]
    async fn empty_list_is_an_error_payload() {
        let value = summarize(serde_json::json!({"values": [], "reason": "summarizing"}))
            .await
            .unwrap();
        assert!(value["error"].is_string());
    }
}

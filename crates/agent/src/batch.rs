//! Batch runner: call one tool over many argument sets and have the model
//! summarize each call.
//!
//! Summaries are produced in a side conversation that never touches the
//! caller's transcript. Each is validated as a [`BatchSummary`] and rendered
//! as a `Status` entry as soon as it is ready.

use std::sync::Arc;

use async_trait::async_trait;
use errand_core::agent::AgentSettings;
use errand_core::error::{AgentError, Error, ToolError};
use errand_core::message::{Message, Transcript};
use errand_core::provider::{Provider, ProviderRequest, ToolChoice};
use errand_core::session::{RenderEntry, SessionContext};
use errand_core::tool::{ParamDecl, ParamType, Tool, ToolArgs, ToolContext, ToolDoc, ToolRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::plan::strip_code_fence;
use crate::prompts;

/// Name of the tool that exposes the batch runner to the model.
pub const RUN_ON_LIST: &str = "run_on_list";

/// A compact summary of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub input: String,
    pub output: String,
}

pub struct BatchRunner {
    provider: Arc<dyn Provider>,
    settings: AgentSettings,
}

impl BatchRunner {
    pub fn new(provider: Arc<dyn Provider>, settings: AgentSettings) -> Self {
        Self { provider, settings }
    }

    /// Invoke `tool_name` once per argument set, in order, and return one
    /// compact `{"input", "output"}` JSON string per call.
    pub async fn run_on_list(
        &self,
        registry: &ToolRegistry,
        session: &dyn SessionContext,
        tool_name: &str,
        arg_sets: Vec<Map<String, Value>>,
        goal: &str,
    ) -> Result<Vec<String>, Error> {
        if registry.get(tool_name).is_none() {
            return Err(ToolError::NotFound(tool_name.to_string()).into());
        }
        if tool_name == RUN_ON_LIST {
            return Err(ToolError::InvalidArguments(format!("{RUN_ON_LIST} cannot batch itself")).into());
        }

        info!(tool = %tool_name, calls = arg_sets.len(), "Running batch");

        let mut side = Transcript::new();
        side.push(Message::system(prompts::batch_preamble(tool_name, goal)));

        let mut summaries = Vec::with_capacity(arg_sets.len());
        for (index, args) in arg_sets.into_iter().enumerate() {
            let input = serde_json::to_string(&args)?;
            let output = registry.invoke(tool_name, args, session).await?;
            debug!(tool = %tool_name, index, "Batch call returned");

            side.push(Message::user(prompts::batch_call(&input, &output)));
            let summary = serde_json::to_string(&self.summarize(&mut side).await?)?;

            session.render(RenderEntry::Status { content: summary.clone() });
            summaries.push(summary);
        }

        Ok(summaries)
    }

    /// Ask for a summary of the last call, correcting invalid replies.
    async fn summarize(&self, side: &mut Transcript) -> Result<BatchSummary, Error> {
        let attempts = self.settings.limits.max_summary_attempts.max(1);
        let mut problem = String::new();

        for attempt in 1..=attempts {
            let request = ProviderRequest {
                model: self.settings.summary_model().to_string(),
                messages: side.messages.clone(),
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
                tools: Vec::new(),
                tool_choice: ToolChoice::None,
            };

            let reply = self.provider.complete(request).await?.message.content;
            side.push(Message::assistant(&reply));

            match serde_json::from_str::<BatchSummary>(strip_code_fence(&reply)) {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, error = %e, "Invalid batch summary");
                    problem = e.to_string();
                    side.push(Message::user(prompts::summary_correction(attempt, &problem)));
                }
            }
        }

        Err(AgentError::SummaryUnparseable { attempts, reason: problem }.into())
    }
}

/// Exposes [`BatchRunner::run_on_list`] to the model.
pub struct RunOnListTool {
    runner: Arc<BatchRunner>,
}

impl RunOnListTool {
    pub fn new(runner: Arc<BatchRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Tool for RunOnListTool {
    fn name(&self) -> &str {
        RUN_ON_LIST
    }

    fn doc(&self) -> ToolDoc {
        ToolDoc::new(
            "Call another function several times with different arguments and get a short \
             summary of each call. Use it instead of calling the same function repeatedly.",
        )
        .param("function_name", "Name of the function to call")
        .param(
            "args",
            "One JSON object of arguments per call, e.g. [\"{\\\"location\\\": \\\"London\\\"}\"]",
        )
        .param("goal", "What the results are needed for, so the summaries keep the right details")
    }

    fn signature(&self) -> Vec<ParamDecl> {
        vec![
            ParamDecl::required("function_name", ParamType::String),
            ParamDecl::required("args", ParamType::array(ParamType::String)),
            ParamDecl::required("goal", ParamType::String),
        ]
    }

    async fn call(&self, args: ToolArgs, ctx: &ToolContext<'_>) -> Result<Value, ToolError> {
        let function_name = args.str("function_name")?;
        let goal = args.str("goal")?;

        let arg_sets = args
            .str_list("args")?
            .iter()
            .enumerate()
            .map(|(i, raw)| match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Ok(map),
                _ => Err(ToolError::InvalidArguments(format!(
                    "args[{i}] must be a JSON object, got: {raw}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let summaries = self
            .runner
            .run_on_list(ctx.registry, ctx.session, function_name, arg_sets, goal)
            .await
            .map_err(|e| match e {
                Error::Tool(e) => e,
                other => ToolError::ExecutionFailed {
                    tool_name: RUN_ON_LIST.into(),
                    reason: other.to_string(),
                },
            })?;

        Ok(Value::from(summaries))
    }
}

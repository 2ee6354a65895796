//! Executing a single model tool call against the registry.
//!
//! Shared by the dispatch loop and the planner: normalizes the call's
//! arguments, surfaces a progress entry, invokes the tool and publishes a
//! [`DomainEvent::ToolInvoked`].

use errand_core::error::ToolError;
use errand_core::event::{DomainEvent, EventBus};
use errand_core::message::MessageToolCall;
use errand_core::session::{RenderEntry, SessionContext};
use errand_core::tool::{REASON_PARAM, ToolRegistry};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::prompts::MISSING_REASON;

/// A tool call with parsed arguments and a guaranteed `reason`.
#[derive(Debug, Clone)]
pub(crate) struct PreparedCall {
    /// The call as it is recorded in the transcript
    pub call: MessageToolCall,
    pub args: Map<String, Value>,
    pub reason: String,
}

pub(crate) fn prepare(call: &MessageToolCall) -> Result<PreparedCall, ToolError> {
    let parsed: Value = if call.arguments.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str(&call.arguments).map_err(|e| {
            ToolError::InvalidArguments(format!(
                "Arguments for '{}' are not valid JSON: {e}",
                call.name
            ))
        })?
    };

    let Value::Object(mut args) = parsed else {
        return Err(ToolError::InvalidArguments(format!(
            "Arguments for '{}' must be a JSON object",
            call.name
        )));
    };

    let reason = match args
        .get(REASON_PARAM)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        Some(reason) => reason.to_string(),
        None => {
            args.insert(REASON_PARAM.into(), Value::from(MISSING_REASON));
            MISSING_REASON.to_string()
        }
    };

    let arguments = serde_json::to_string(&args).map_err(|e| ToolError::Serialization {
        tool_name: call.name.clone(),
        reason: e.to_string(),
    })?;

    let id = if call.id.is_empty() {
        format!("call_{}", uuid::Uuid::new_v4().simple())
    } else {
        call.id.clone()
    };

    Ok(PreparedCall {
        call: MessageToolCall { id, name: call.name.clone(), arguments },
        args,
        reason,
    })
}

pub(crate) async fn invoke(
    tools: &ToolRegistry,
    session: &dyn SessionContext,
    event_bus: &EventBus,
    prepared: &PreparedCall,
) -> Result<String, ToolError> {
    let name = prepared.call.name.as_str();

    if tools.get(name).is_some_and(|spec| spec.show_progress()) {
        session.render(RenderEntry::Progress { label: prepared.reason.clone() });
    }

    let start = std::time::Instant::now();
    let result = tools.invoke(name, prepared.args.clone(), session).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(output) => debug!(tool = %name, duration_ms, bytes = output.len(), "Tool returned"),
        Err(e) => warn!(tool = %name, duration_ms, error = %e, "Tool invocation failed"),
    }

    event_bus.publish(DomainEvent::ToolInvoked {
        tool_name: name.to_string(),
        reason: prepared.reason.clone(),
        success: result.is_ok(),
        duration_ms,
        timestamp: chrono::Utc::now(),
    });

    result
}

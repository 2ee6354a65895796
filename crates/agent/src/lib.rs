//! The agent loops of errand.
//!
//! - [`Conversator`]: one user message in, one reply out, with tool calls
//!   dispatched one at a time in between
//! - [`TaskAgent`]: plan a task, then execute, verify and amend step by step
//! - [`BatchRunner`]: call one tool over many argument sets and summarize
//!   each call (exposed to the model as [`RunOnListTool`])
//!
//! Every loop is bounded by [`AgentLimits`](errand_core::agent::AgentLimits).

pub mod batch;
pub mod conversator;
mod dispatch;
pub mod plan;
pub mod planner;
pub mod prompts;

#[cfg(test)]
mod test_helpers;

pub use batch::{BatchRunner, BatchSummary, RUN_ON_LIST, RunOnListTool};
pub use conversator::{Conversator, DispatchState};
pub use plan::{Plan, PlanParseError};
pub use planner::{TaskAgent, TaskResult, TaskState};

//! Task planner: plan, then execute and verify each step.
//!
//! The planner runs its own internal conversation with the model:
//!
//! 1. **Plan**: ask for `{"steps": [...]}` with tools disabled, correcting
//!    malformed replies a bounded number of times
//! 2. **Execute**: one dispatch turn per step, tools enabled
//! 3. **Verify**: a yes/no question per step, retrying the step on "no"
//! 4. **Amend**: after each step, ask whether the plan needs changing and
//!    take a replacement plan if so
//! 5. **Consolidate**: ask for the final output of the whole task
//!
//! Every loop is bounded by [`AgentLimits`](errand_core::agent::AgentLimits).
//! Tool failures are reported back to the model as `{"error": ...}` results;
//! the step's verification and retry absorb them.

use std::sync::Arc;

use errand_core::agent::AgentSettings;
use errand_core::error::{AgentError, Error};
use errand_core::event::{DomainEvent, EventBus};
use errand_core::message::{Message, MessageToolCall, Transcript};
use errand_core::provider::{Provider, ProviderRequest, ToolChoice};
use errand_core::session::SessionContext;
use errand_core::tool::ToolRegistry;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dispatch;
use crate::plan::Plan;
use crate::prompts;

/// Where the planner is within a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    Planning,
    Replanning,
    StepExecuting { index: usize },
    StepVerifying { index: usize },
    TaskComplete,
    Failed,
}

/// The outcome of a completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// The consolidated final output
    pub answer: String,

    /// The plan as it stood when the task finished
    pub plan: Plan,

    pub steps_completed: usize,
    pub replans: u32,

    /// Tool invocations across all steps
    pub tool_calls: usize,
}

/// A planning agent over a tool registry.
pub struct TaskAgent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    session: Arc<dyn SessionContext>,
    event_bus: Arc<EventBus>,
    settings: AgentSettings,
    transcript: Transcript,
    state: TaskState,
    tool_calls: usize,
}

impl TaskAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        session: Arc<dyn SessionContext>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            session,
            event_bus: Arc::new(EventBus::default()),
            settings,
            transcript: Transcript::new(),
            state: TaskState::Planning,
            tool_calls: 0,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// The planner's internal conversation for the current or last task.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript.messages
    }

    /// Run a task to completion. Each call starts from an empty transcript.
    pub async fn run(&mut self, task: &str) -> Result<TaskResult, Error> {
        self.transcript.clear();
        self.tool_calls = 0;
        self.state = TaskState::Planning;
        info!(transcript_id = %self.transcript.id, "Starting task");

        let result = self.execute(task).await;
        if let Err(e) = &result {
            warn!(error = %e, state = ?self.state, "Task failed");
            self.state = TaskState::Failed;
        }
        result
    }

    async fn execute(&mut self, task: &str) -> Result<TaskResult, Error> {
        let mut plan = self.make_plan(prompts::plan_request(task)).await?;
        self.event_bus.publish(DomainEvent::PlanCreated {
            steps: plan.steps.clone(),
            timestamp: chrono::Utc::now(),
        });

        let max_replans = self.settings.limits.max_replans;
        let mut replans = 0;
        let mut steps_completed = 0;
        let mut index = 0;

        while let Some(step) = plan.steps.get(index).cloned() {
            self.run_step(index, &step).await?;
            steps_completed += 1;

            let answer = self.ask(prompts::amend_question(&plan.steps), false).await?;
            if self.settings.verification.is_affirmative(&answer) {
                if replans >= max_replans {
                    warn!(after_step = index, max_replans, "Amendment requested past the replan limit; ignoring");
                } else {
                    self.state = TaskState::Replanning;
                    plan = self.make_plan(prompts::AMEND_REQUEST.to_string()).await?;
                    replans += 1;
                    info!(after_step = index, steps = plan.len(), replans, "Plan amended");
                    self.event_bus.publish(DomainEvent::PlanAmended {
                        after_step: index,
                        steps: plan.steps.clone(),
                        timestamp: chrono::Utc::now(),
                    });
                }
            }

            index += 1;
        }

        self.state = TaskState::TaskComplete;
        let answer = self.ask(prompts::consolidation(task), false).await?;
        if answer.trim().is_empty() {
            return Err(AgentError::EmptyReply.into());
        }

        info!(steps_completed, replans, tool_calls = self.tool_calls, "Task complete");

        Ok(TaskResult {
            answer,
            plan,
            steps_completed,
            replans,
            tool_calls: self.tool_calls,
        })
    }

    /// Ask for a plan, correcting malformed replies until one parses.
    async fn make_plan(&mut self, request: String) -> Result<Plan, Error> {
        let attempts = self.settings.limits.max_plan_attempts.max(1);
        let mut prompt = request;

        for attempt in 1..=attempts {
            let reply = self.ask(prompt, false).await?;
            match Plan::parse(&reply) {
                Ok(plan) => {
                    info!(attempt, steps = plan.len(), "Plan accepted");
                    return Ok(plan);
                }
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, error = %e, "Malformed plan");
                    prompt = prompts::plan_correction(attempt, &e.to_string());
                }
            }
        }

        Err(AgentError::PlanUnparseable { attempts }.into())
    }

    /// Execute one step and verify it, retrying on a negative verdict.
    async fn run_step(&mut self, index: usize, step: &str) -> Result<(), Error> {
        let attempts = self.settings.limits.max_step_attempts.max(1);
        let mut prompt = prompts::step_request(step);

        for attempt in 1..=attempts {
            self.state = TaskState::StepExecuting { index };
            debug!(step_index = index, attempt, "Executing step");
            self.ask(prompt, true).await?;

            self.state = TaskState::StepVerifying { index };
            let verdict = self.ask(prompts::verify_question(step), false).await?;
            if self.settings.verification.is_affirmative(&verdict) {
                info!(step_index = index, attempt, "Step completed");
                self.event_bus.publish(DomainEvent::StepCompleted {
                    index,
                    step: step.to_string(),
                    attempts: attempt,
                    timestamp: chrono::Utc::now(),
                });
                return Ok(());
            }

            debug!(step_index = index, attempt, verdict = %verdict, "Step not verified");
            prompt = prompts::step_retry(step, attempt + 1);
        }

        Err(AgentError::StepFailed { step: step.to_string(), attempts }.into())
    }

    /// Issue a prompt and return the model's text reply.
    ///
    /// With tools allowed, tool calls are executed one per reply until the
    /// model answers in text. With tools disallowed, any tool call in the
    /// reply is stripped and only its text is kept.
    async fn ask(&mut self, prompt: String, allow_tools: bool) -> Result<String, Error> {
        self.transcript.push(Message::system(prompt));

        let definitions = self.tools.definitions();
        let max_rounds = self.settings.limits.max_tool_rounds;

        for round in 1..=max_rounds + 1 {
            let mut messages = self.transcript.messages.clone();
            messages.push(Message::system(prompts::datasets_note(
                &self.session.dataset_overview(),
            )));

            let request = ProviderRequest {
                model: self.settings.model.clone(),
                messages,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
                tools: definitions.clone(),
                tool_choice: ToolChoice::from_allowed(allow_tools),
            };

            let mut message = self.provider.complete(request).await?.message;

            if !message.tool_calls.is_empty() && !allow_tools {
                debug!(dropped = message.tool_calls.len(), "Tool call while tools are disabled; stripping");
                message.tool_calls.clear();
            }

            let Some(call) = message.tool_calls.first().cloned() else {
                let reply = message.content.clone();
                self.transcript.push(message);
                return Ok(reply);
            };

            if round > max_rounds {
                break;
            }

            self.execute_call(&call).await;
        }

        Err(AgentError::ToolRoundsExceeded { limit: max_rounds }.into())
    }

    /// Run one tool call and append the call and its result. Failures become
    /// an error payload the model can read.
    async fn execute_call(&mut self, call: &MessageToolCall) {
        self.tool_calls += 1;

        let (recorded, output) = match dispatch::prepare(call) {
            Ok(prepared) => {
                let output = dispatch::invoke(
                    &self.tools,
                    self.session.as_ref(),
                    &self.event_bus,
                    &prepared,
                )
                .await;
                (prepared.call, output)
            }
            Err(e) => (call.clone(), Err(e)),
        };

        let content = output.unwrap_or_else(|e| {
            warn!(tool = %recorded.name, error = %e, "Reporting tool failure to the model");
            serde_json::json!({ "error": e.to_string() }).to_string()
        });

        let result = Message::tool_result(&recorded.id, &recorded.name, content);
        self.transcript.push(Message::tool_call(recorded));
        self.transcript.push(result);
    }
}

//! The dispatch loop: one user message in, one final reply out.
//!
//! Each turn alternates between the model and the tool registry:
//!
//! 1. **Append** the user message to both transcripts
//! 2. **Ask** the model, with the tool schemas and a transient dataset note
//! 3. **If a tool call**: run exactly one tool, append call + result, go to 2
//! 4. **If text**: append it to both transcripts and return it
//!
//! [`Conversator::send`] wraps a turn in the retry ceiling and rolls back
//! every failed attempt, so a failed turn leaves no trace in either
//! transcript.

use std::sync::Arc;

use errand_core::agent::AgentSettings;
use errand_core::error::{AgentError, Error};
use errand_core::event::{DomainEvent, EventBus};
use errand_core::message::{Message, Transcript};
use errand_core::provider::{Provider, ProviderRequest, ToolChoice};
use errand_core::session::{RenderEntry, SessionContext};
use errand_core::tool::ToolRegistry;
use tracing::{debug, error, info, warn};

use crate::dispatch;
use crate::prompts;

/// Where the dispatch loop is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    AwaitingUser,
    AwaitingModel,
    ExecutingTool,
    Done,
}

/// A conversational agent over a tool registry.
pub struct Conversator {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    session: Arc<dyn SessionContext>,
    event_bus: Arc<EventBus>,
    settings: AgentSettings,
    system_prompt: String,

    /// User-facing transcript: user turns and final replies
    messages: Transcript,

    /// Everything: system prompt, user turns, tool calls, tool results, replies
    internal: Transcript,

    state: DispatchState,

    /// Transcript lengths after the last successful turn
    last_good: (usize, usize),
}

impl Conversator {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        session: Arc<dyn SessionContext>,
        settings: AgentSettings,
    ) -> Self {
        let system_prompt = settings
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| prompts::DISPATCH_SYSTEM_PROMPT.to_string());

        let mut conversator = Self {
            provider,
            tools,
            session,
            event_bus: Arc::new(EventBus::default()),
            settings,
            system_prompt,
            messages: Transcript::new(),
            internal: Transcript::new(),
            state: DispatchState::AwaitingUser,
            last_good: (0, 0),
        };
        conversator.reset();
        conversator
    }

    /// Publish domain events on a shared bus.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    /// Send a user message, retrying failed attempts up to the configured
    /// ceiling. On exhaustion both transcripts are back where they were
    /// before the message and only a generic error is returned.
    pub async fn send(&mut self, text: &str) -> Result<String, AgentError> {
        let checkpoint = (self.messages.len(), self.internal.len());
        let attempts = self.settings.limits.max_attempts.max(1);
        let mut last_error = None;

        self.session.render(RenderEntry::User { content: text.to_string() });

        for attempt in 1..=attempts {
            match self.process_msg(text).await {
                Ok(reply) => {
                    self.session.render(RenderEntry::Assistant { content: reply.clone() });
                    return Ok(reply);
                }
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, error = %e, "Turn attempt failed");
                    self.rollback(checkpoint);
                    last_error = Some(e);
                }
            }
        }

        let detail = last_error.map(|e| e.to_string()).unwrap_or_default();
        error!(attempts, error = %detail, "Turn failed after every attempt");
        self.event_bus.publish(DomainEvent::TurnFailed {
            attempts,
            error_message: detail,
            timestamp: chrono::Utc::now(),
        });

        Err(AgentError::TurnFailed { attempts })
    }

    /// Run one attempt of a turn. On error the transcripts may hold a
    /// partial turn; callers roll back with [`Conversator::reset_to_last`].
    pub async fn process_msg(&mut self, text: &str) -> Result<String, Error> {
        info!(
            transcript_id = %self.internal.id,
            messages = self.internal.len(),
            "Processing user message"
        );

        self.event_bus.publish(DomainEvent::MessageReceived {
            transcript_id: self.internal.id.to_string(),
            content_preview: text.chars().take(80).collect(),
            timestamp: chrono::Utc::now(),
        });

        self.messages.push(Message::user(text));
        self.internal.push(Message::user(text));

        let tool_definitions = self.tools.definitions();
        let max_rounds = self.settings.limits.max_tool_rounds;

        for round in 1..=max_rounds + 1 {
            self.state = DispatchState::AwaitingModel;
            debug!(transcript_id = %self.internal.id, round, "Dispatch round");

            let mut messages = self.internal.messages.clone();
            messages.push(Message::system(prompts::datasets_note(
                &self.session.dataset_overview(),
            )));

            let request = ProviderRequest {
                model: self.settings.model.clone(),
                messages,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
                tools: tool_definitions.clone(),
                tool_choice: ToolChoice::Auto,
            };

            let response = self.provider.complete(request).await?;

            let Some(first_call) = response.message.tool_calls.first().cloned() else {
                let reply = response.message.content.clone();

                self.event_bus.publish(DomainEvent::ResponseGenerated {
                    transcript_id: self.internal.id.to_string(),
                    model: response.model.clone(),
                    tokens_used: response.usage.as_ref().map_or(0, |u| u.total_tokens),
                    timestamp: chrono::Utc::now(),
                });

                self.messages.push(Message::assistant(&reply));
                self.internal.push(response.message);
                self.last_good = (self.messages.len(), self.internal.len());
                self.state = DispatchState::Done;
                return Ok(reply);
            };

            if round > max_rounds {
                break;
            }

            if response.message.tool_calls.len() > 1 {
                debug!(
                    dropped = response.message.tool_calls.len() - 1,
                    "Only the first tool call of a reply is executed"
                );
            }

            self.state = DispatchState::ExecutingTool;
            let prepared = dispatch::prepare(&first_call)?;
            self.internal.push(Message::tool_call(prepared.call.clone()));

            let output =
                dispatch::invoke(&self.tools, self.session.as_ref(), &self.event_bus, &prepared)
                    .await?;
            self.internal.push(Message::tool_result(
                &prepared.call.id,
                &prepared.call.name,
                output,
            ));
        }

        Err(AgentError::ToolRoundsExceeded { limit: max_rounds }.into())
    }

    /// Clear both transcripts. Calling it twice is the same as once.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.internal.clear();
        self.internal.push(Message::system(&self.system_prompt));
        self.last_good = (self.messages.len(), self.internal.len());
        self.state = DispatchState::AwaitingUser;
    }

    /// Drop everything after the last successful turn.
    pub fn reset_to_last(&mut self) {
        self.rollback(self.last_good);
    }

    fn rollback(&mut self, (messages, internal): (usize, usize)) {
        self.messages.truncate(messages);
        self.internal.truncate(internal);
        self.state = DispatchState::AwaitingUser;
    }

    /// The user-facing transcript.
    pub fn messages(&self) -> &[Message] {
        &self.messages.messages
    }

    /// The internal transcript, including tool traffic.
    pub fn internal_messages(&self) -> &[Message] {
        &self.internal.messages
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

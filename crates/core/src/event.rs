//! Domain event system: decoupled observation of the dispatch loop and planner.
//!
//! Events are published when something interesting happens in a turn.
//! The CLI subscribes and logs them; tests subscribe to assert on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A user message entered the dispatch loop
    MessageReceived {
        transcript_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The model produced a final text reply
    ResponseGenerated {
        transcript_id: String,
        model: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// A tool was invoked on the model's behalf
    ToolInvoked {
        tool_name: String,
        reason: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The planner produced (or re-produced) a plan
    PlanCreated {
        steps: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A plan step passed verification
    StepCompleted {
        index: usize,
        step: String,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// The plan was replaced after a step
    PlanAmended {
        after_step: usize,
        steps: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// A user turn failed after every retry
    TurnFailed {
        attempts: u32,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

//! Message and Transcript domain types.
//!
//! A [`Transcript`] is the ordered history that drives a model completion
//! call. The dispatch loop keeps two of them: a user-facing one and an
//! internal one that also holds system notes, tool calls and tool results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transcript (one per session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TranscriptId(pub String);

impl TranscriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for TranscriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TranscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The model; free text or a tool-call directive
    Assistant,
    /// Instructions and context injected by the agent
    System,
    /// A tool result
    Tool,
}

/// A single message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content (for tool results: the JSON-serialized return value)
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// If this is a tool result, the name of the tool that produced it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create an assistant message carrying a single tool-call directive.
    pub fn tool_call(call: MessageToolCall) -> Self {
        let mut msg = Self::with_role(Role::Assistant, String::new());
        msg.tool_calls.push(call);
        msg
    }

    /// Create a tool result message.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::with_role(Role::Tool, content.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg.name = Some(tool_name.into());
        msg
    }

    /// Whether this is an assistant message carrying a tool-call directive.
    pub fn is_tool_call(&self) -> bool {
        self.role == Role::Assistant && !self.tool_calls.is_empty()
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// An ordered, append-only (except for rollback) sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Unique transcript ID
    pub id: TranscriptId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this transcript was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new empty transcript.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: TranscriptId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Roll back to a previously observed length. No-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
        self.updated_at = Utc::now();
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Indices of assistant tool-call messages that are not immediately
    /// followed by exactly one matching tool result per call.
    pub fn dangling_tool_calls(&self) -> Vec<usize> {
        let mut dangling = Vec::new();
        for (i, msg) in self.messages.iter().enumerate() {
            if !msg.is_tool_call() {
                continue;
            }
            let results = &self.messages[i + 1..];
            let answered = msg.tool_calls.len() <= results.len()
                && msg.tool_calls.iter().zip(results).all(|(call, result)| {
                    result.role == Role::Tool
                        && result.tool_call_id.as_deref() == Some(call.id.as_str())
                });
            let overanswered = results
                .get(msg.tool_calls.len())
                .is_some_and(|next| next.role == Role::Tool);
            if !answered || overanswered {
                dangling.push(i);
            }
        }
        dangling
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> MessageToolCall {
        MessageToolCall {
            id: id.into(),
            name: "get_weather".into(),
            arguments: "{}".into(),
        }
    }

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, agent!");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn tool_result_carries_tool_name() {
        let msg = Message::tool_result("call_1", "get_weather", "{}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.name.as_deref(), Some("get_weather"));
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn truncate_rolls_back() {
        let mut t = Transcript::new();
        t.push(Message::user("one"));
        let checkpoint = t.len();
        t.push(Message::user("two"));
        t.push(Message::assistant("three"));
        t.truncate(checkpoint);
        assert_eq!(t.len(), 1);
        assert_eq!(t.last().unwrap().content, "one");
    }

    #[test]
    fn answered_tool_call_is_not_dangling() {
        let mut t = Transcript::new();
        t.push(Message::user("weather?"));
        t.push(Message::tool_call(call("c1")));
        t.push(Message::tool_result("c1", "get_weather", "{}"));
        t.push(Message::assistant("Sunny"));
        assert!(t.dangling_tool_calls().is_empty());
    }

    #[test]
    fn unanswered_tool_call_is_dangling() {
        let mut t = Transcript::new();
        t.push(Message::tool_call(call("c1")));
        t.push(Message::assistant("forgot the result"));
        assert_eq!(t.dangling_tool_calls(), vec![0]);
    }

    #[test]
    fn double_result_is_dangling() {
        let mut t = Transcript::new();
        t.push(Message::tool_call(call("c1")));
        t.push(Message::tool_result("c1", "get_weather", "{}"));
        t.push(Message::tool_result("c1", "get_weather", "{}"));
        assert_eq!(t.dangling_tool_calls(), vec![0]);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::user("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "Test message");
        assert_eq!(deserialized.role, Role::User);
    }
}

//! # errand core
//!
//! Domain types, traits and error definitions for the errand task agent.
//! This crate has no framework dependencies beyond serde and tokio's sync
//! primitives; it defines the model every other crate implements against.
//!
//! - [`tool`]: the Tool trait and the ToolSpec registry
//! - [`provider`]: the model completion endpoint
//! - [`message`]: messages and transcripts
//! - [`session`]: render sink and dataset catalog injected per session

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentLimits, AgentSettings, VerificationMode};
pub use error::{AgentError, Error, ProviderError, RegistrationError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, MessageToolCall, Role, Transcript, TranscriptId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolChoice, ToolDefinition, Usage};
pub use session::{DatasetDetails, MemorySession, NullSession, RenderEntry, SessionContext};
pub use tool::{
    ParamDecl, ParamDoc, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolDoc, ToolRegistry,
    ToolSpec,
};

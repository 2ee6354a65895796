//! Error types for the errand domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them all.

use thiserror::Error;

/// The top-level error type for all errand operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Registration errors ---
    #[error("Tool registration error: {0}")]
    Registration(#[from] RegistrationError),

    // --- Agent control-flow errors ---
    #[error(transparent)]
    Agent(#[from] AgentError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Cannot coerce argument '{param}' to {expected}: {value}")]
    Coercion {
        param: String,
        expected: String,
        value: String,
    },

    #[error("Tool '{tool_name}' returned an unserializable result: {reason}")]
    Serialization { tool_name: String, reason: String },
}

/// Raised while turning a [`Tool`](crate::tool::Tool) into a
/// [`ToolSpec`](crate::tool::ToolSpec). Always fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Tool '{tool}' documents {documented} parameter(s) but declares {declared}")]
    ParamCountMismatch {
        tool: String,
        documented: usize,
        declared: usize,
    },

    #[error(
        "Tool '{tool}': documented parameter '{documented}' at position {index} does not match declared parameter '{declared}'"
    )]
    ParamOrderMismatch {
        tool: String,
        index: usize,
        documented: String,
        declared: String,
    },

    #[error("Tool '{tool}': parameter '{param}' has no description")]
    MissingParamDescription { tool: String, param: String },

    #[error("Tool '{0}' has no description")]
    MissingDescription(String),

    #[error("Tool '{tool}' declares the reserved parameter name '{param}'")]
    ReservedParam { tool: String, param: String },

    #[error("A tool named '{0}' is already registered")]
    Duplicate(String),
}

/// Control-flow failures of the dispatch loop, planner and batch runner.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The user-visible failure after the retry ceiling is exhausted.
    /// The underlying cause is logged, never displayed.
    #[error("Something went wrong, please try again.")]
    TurnFailed { attempts: u32 },

    #[error("Exceeded {limit} tool rounds without a final answer")]
    ToolRoundsExceeded { limit: u32 },

    #[error("No valid plan after {attempts} attempt(s)")]
    PlanUnparseable { attempts: u32 },

    #[error("Step '{step}' was not completed after {attempts} attempt(s)")]
    StepFailed { step: String, attempts: u32 },

    #[error("Model returned no text for a prompt that requires one")]
    EmptyReply,

    #[error("Invalid batch summary after {attempts} attempt(s): {reason}")]
    SummaryUnparseable { attempts: u32, reason: String },
}

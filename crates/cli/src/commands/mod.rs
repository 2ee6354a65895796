pub mod chat;
pub mod doctor;
pub mod onboard;
pub mod task;
pub mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use errand_agent::{BatchRunner, RunOnListTool};
use errand_config::AppConfig;
use errand_core::agent::AgentSettings;
use errand_core::event::{DomainEvent, EventBus};
use errand_core::provider::Provider;
use errand_core::tool::{Tool, ToolRegistry};

use crate::terminal::TerminalSession;

/// Everything a command needs to drive an agent.
pub struct Runtime {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub tools: Arc<ToolRegistry>,
    pub session: Arc<TerminalSession>,
    pub event_bus: Arc<EventBus>,
    pub settings: AgentSettings,
}

impl Runtime {
    pub fn load(datasets: Option<PathBuf>, verbose: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

        if !config.has_api_key() && config.default_provider != "ollama" {
            eprintln!();
            eprintln!("  ERROR: No API key configured!");
            eprintln!();
            eprintln!("  Set one of these environment variables:");
            eprintln!("    export OPENAI_API_KEY=sk-...");
            eprintln!("    export OPENROUTER_API_KEY=sk-or-v1-...");
            eprintln!("    export ERRAND_API_KEY=sk-...");
            eprintln!();
            eprintln!("  Or add it to your config file:");
            eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
            eprintln!();
            return Err("No API key found. See above for setup instructions.".into());
        }

        let router = errand_providers::router::build_from_config(&config);
        let provider = router.default().ok_or("No default provider configured")?;
        let settings = config.agent_settings();
        let tools = Arc::new(build_registry(provider.clone(), &settings)?);
        let session = Arc::new(TerminalSession::from_option(datasets.as_deref())?);

        let event_bus = Arc::new(EventBus::default());
        if verbose {
            spawn_event_logger(&event_bus);
        }

        Ok(Self { config, provider, tools, session, event_bus, settings })
    }
}

/// The built-in tools plus `run_on_list`, which batches any of them.
pub fn build_registry(
    provider: Arc<dyn Provider>,
    settings: &AgentSettings,
) -> Result<ToolRegistry, Box<dyn std::error::Error>> {
    let runner = Arc::new(BatchRunner::new(provider, settings.clone()));
    let mut tools = errand_tools::builtin_tools();
    tools.push(Arc::new(RunOnListTool::new(runner)) as Arc<dyn Tool>);
    Ok(ToolRegistry::from_tools(tools).map_err(|e| format!("Tool registration failed: {e}"))?)
}

/// Log every domain event at debug level.
fn spawn_event_logger(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ToolInvoked { tool_name, reason, success, duration_ms, .. } => {
                    tracing::debug!(tool = %tool_name, %reason, success, duration_ms, "event: tool invoked")
                }
                DomainEvent::PlanCreated { steps, .. } => {
                    tracing::debug!(steps = steps.len(), "event: plan created")
                }
                DomainEvent::PlanAmended { after_step, steps, .. } => {
                    tracing::debug!(after_step, steps = steps.len(), "event: plan amended")
                }
                DomainEvent::StepCompleted { index, attempts, .. } => {
                    tracing::debug!(step_index = index, attempts, "event: step completed")
                }
                DomainEvent::ResponseGenerated { model, tokens_used, .. } => {
                    tracing::debug!(%model, tokens_used, "event: response generated")
                }
                DomainEvent::TurnFailed { attempts, error_message, .. } => {
                    tracing::debug!(attempts, error = %error_message, "event: turn failed")
                }
                DomainEvent::MessageReceived { content_preview, .. } => {
                    tracing::debug!(preview = %content_preview, "event: message received")
                }
            }
        }
    });
}

//! `errand task`: plan and execute a multi-step task.

use std::path::PathBuf;

use errand_agent::TaskAgent;
use errand_core::agent::VerificationMode;

use super::Runtime;

pub async fn run(
    task: &str,
    strict: bool,
    datasets: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load(datasets, verbose)?;

    let mut settings = runtime.settings.clone();
    if strict {
        settings.verification = VerificationMode::Strict;
    }

    let mut agent = TaskAgent::new(
        runtime.provider.clone(),
        runtime.tools.clone(),
        runtime.session.clone(),
        settings,
    )
    .with_event_bus(runtime.event_bus.clone());

    eprintln!("  Planning...");
    let result = agent.run(task).await?;

    eprintln!();
    eprintln!("  Plan:");
    for (i, step) in result.plan.steps.iter().enumerate() {
        eprintln!("    {}. {step}", i + 1);
    }
    eprintln!(
        "  {} step(s), {} tool call(s), {} amendment(s)",
        result.steps_completed, result.tool_calls, result.replans
    );
    eprintln!();

    println!("{}", result.answer);

    Ok(())
}

//! `errand tools`: print the tool schemas sent to the model.

use std::sync::Arc;

use errand_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let router = errand_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let registry = super::build_registry(Arc::clone(&provider), &config.agent_settings())?;
    let schemas: Vec<serde_json::Value> = registry
        .definitions()
        .into_iter()
        .map(|def| {
            serde_json::json!({
                "name": def.name,
                "description": def.description,
                "parameters": def.parameters,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

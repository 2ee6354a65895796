//! `errand doctor`: diagnose configuration and provider health.

use errand_config::AppConfig;
use errand_core::provider::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("errand doctor");
    println!("=============\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  [ok]   Config file found: {}", config_path.display());
    } else {
        println!("  [warn] No config file, using defaults (run `errand onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Config valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 blocking issue found.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
    } else {
        println!("  [warn] No API key: set OPENAI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match errand_tools::default_registry() {
        Ok(registry) => println!("  [ok]   {} built-in tools registered", registry.len()),
        Err(e) => {
            println!("  [fail] Tool registration: {e}");
            issues += 1;
        }
    }

    let router = errand_providers::router::build_from_config(&config);
    match router.default() {
        Some(provider) => match provider.health_check().await {
            Ok(true) => println!("  [ok]   Provider '{}' reachable", router.default_name()),
            Ok(false) => {
                println!("  [warn] Provider '{}' answered but is not healthy", router.default_name());
                issues += 1;
            }
            Err(e) => {
                println!("  [fail] Provider '{}': {e}", router.default_name());
                issues += 1;
            }
        },
        None => {
            println!("  [fail] No default provider");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

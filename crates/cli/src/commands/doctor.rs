//! `puzzlebot doctor`: Diagnose system health.

use puzzlebot_config::AppConfig;
use puzzlebot_core::sandbox::CodeSandbox;
use puzzlebot_core::source::TaskSource;
use puzzlebot_providers::router;
use puzzlebot_sandbox::CargoSandbox;
use puzzlebot_tracker::{CredentialStore, HttpTaskSource};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 puzzlebot Doctor: System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    // Config
    let config = match AppConfig::load_with(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    if config.server.user_token.is_some() {
        println!("  ✅ User token configured");
    } else {
        println!("  ⚠️  No server.user_token; the server may reject requests");
        issues += 1;
    }

    // Sibling project
    let sandbox = CargoSandbox::from_config(&config.sandbox);
    let template = sandbox.template_path();
    if template.is_file() {
        println!("  ✅ Template found at {}", template.display());
    } else {
        println!("  ❌ No template at {}", template.display());
        issues += 1;
    }

    // Credentials
    match CredentialStore::new(&config.credentials_dir).load() {
        Ok(Some(agent)) => println!("  ✅ Registered as agent {}", agent.id),
        Ok(None) => println!("  ℹ️  No agent yet; one is registered on the first run"),
        Err(e) => {
            println!("  ❌ Credentials unreadable: {e}");
            issues += 1;
        }
    }

    // Task server
    match HttpTaskSource::from_config(&config.server) {
        Ok(source) => {
            if source.health_check().await.unwrap_or(false) {
                println!("  ✅ Task server reachable at {}", source.base_url());
            } else {
                println!("  ❌ Task server unreachable at {}", source.base_url());
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Task server client: {e}");
            issues += 1;
        }
    }

    // Inference endpoint
    match router::build_from_config(&config) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => {
                println!("  ✅ Inference endpoint ({}) reachable", provider.name());
                let models = provider.list_models().await.unwrap_or_default();
                if !models.is_empty() && !models.contains(&config.inference.model) {
                    println!(
                        "  ⚠️  Model {} not among served models: {}",
                        config.inference.model,
                        models.join(", ")
                    );
                    issues += 1;
                }
            }
            _ => {
                println!("  ❌ Inference endpoint ({}) unreachable", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Inference provider not usable: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

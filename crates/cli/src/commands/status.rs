//! `puzzlebot status`: Show the task list.

use chrono::DateTime;
use puzzlebot_config::AppConfig;
use puzzlebot_core::source::TaskSource;
use puzzlebot_core::task::TaskSummary;
use puzzlebot_tracker::{CredentialStore, HttpTaskSource};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load_with(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🧩 puzzlebot Status");
    println!("===================");
    println!("  Server:       {}", config.server.base_url);
    println!("  Inference:    {} ({})", config.inference.provider, config.inference.model);
    println!("  Sandbox:      {}", config.sandbox.project_dir.display());
    println!("  Attempts:     {}", config.max_attempts);

    let Some(agent) = CredentialStore::new(&config.credentials_dir).load()? else {
        println!("\n  ⚠️  No agent registered yet. `puzzlebot run` registers one.");
        return Ok(());
    };
    println!("  Agent:        {}", agent.id);

    let source = HttpTaskSource::from_config(&config.server)?;
    let tasks = source.list_tasks(&agent).await?;

    println!();
    if tasks.is_empty() {
        println!("  No tasks assigned.");
    }
    for task in &tasks {
        println!("  {}", format_task(task));
    }

    let done = tasks.iter().filter(|t| t.completed).count();
    println!("\n  {done}/{} completed", tasks.len());
    Ok(())
}

fn format_task(task: &TaskSummary) -> String {
    let state = if task.completed { "✅" } else { "⏳" };
    let when = task
        .time
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map(|t| format!("  completed {}", t.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_default();
    format!("{state} {} [{}]{when}", task.name, task.id)
}

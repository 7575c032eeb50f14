//! `puzzlebot run`: Solve open tasks.

use puzzlebot_agent::{Bot, RunOptions, RunReport};
use puzzlebot_config::{AppConfig, SolutionFilter};
use puzzlebot_core::task::{TaskId, TaskOutcome};
use std::path::Path;
use tracing::debug;

/// Command-line settings layered over the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    pub task: Option<String>,
    pub max_attempts: Option<u32>,
    pub raw_output: bool,
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(max) = self.max_attempts {
            config.max_attempts = max;
        }
        if self.raw_output {
            config.sandbox.solution_filter = SolutionFilter::Raw;
        }
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            task: self.task.as_deref().map(TaskId::from),
        }
    }
}

pub async fn run(config_path: Option<&Path>, overrides: Overrides) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load_with(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    overrides.apply(&mut config);
    config.validate()?;
    debug!(?config, "Loaded config");

    let bot = Bot::from_config(&config)?;
    let report = bot.run(&overrides.options()).await?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    if report.tasks.is_empty() {
        println!("  No tasks to work on.");
        return;
    }

    for task in &report.tasks {
        println!("  {} {} ({})", outcome_marker(&task.outcome), task.name, task.id);
    }
    println!();
    println!(
        "  {} solved, {} already completed, {} unsolved ({} attempts)",
        report.solved(),
        report.skipped(),
        report.exhausted(),
        report.attempts()
    );
}

fn outcome_marker(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Skipped => "✔ already done".into(),
        TaskOutcome::Succeeded { attempts } => format!("✅ solved in {attempts}"),
        TaskOutcome::Exhausted { attempts } => format!("❌ gave up after {attempts}"),
    }
}

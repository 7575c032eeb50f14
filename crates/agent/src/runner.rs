//! The top-level run: identify, list, and work through every task.

use puzzlebot_config::AppConfig;
use puzzlebot_core::source::{AgentCredentials, TaskSource};
use puzzlebot_core::task::{TaskId, TaskOutcome};
use puzzlebot_providers::router;
use puzzlebot_sandbox::CargoSandbox;
use puzzlebot_tracker::{CredentialStore, HttpTaskSource};
use std::sync::Arc;
use tracing::{info, warn};

use crate::dispatcher::{Dispatcher, Solver};
use crate::retry::RetryController;

/// Knobs for a single run that do not belong in the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only work on this task.
    pub task: Option<TaskId>,
}

/// What happened to one task during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub id: TaskId,
    pub name: String,
    pub outcome: TaskOutcome,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub tasks: Vec<TaskReport>,
}

impl RunReport {
    pub fn solved(&self) -> usize {
        self.count(|o| o.is_solved())
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Skipped))
    }

    pub fn exhausted(&self) -> usize {
        self.count(|o| matches!(o, TaskOutcome::Exhausted { .. }))
    }

    /// Attempts spent across the whole run.
    pub fn attempts(&self) -> u32 {
        self.tasks.iter().map(|t| t.outcome.attempts()).sum()
    }

    fn count(&self, pred: impl Fn(&TaskOutcome) -> bool) -> usize {
        self.tasks.iter().filter(|t| pred(&t.outcome)).count()
    }
}

/// The task-solving bot.
pub struct Bot {
    source: Arc<dyn TaskSource>,
    credentials: CredentialStore,
    controller: RetryController,
    agent_name: String,
}

impl Bot {
    pub fn new(
        source: Arc<dyn TaskSource>,
        solver: Arc<dyn Solver>,
        credentials: CredentialStore,
        agent_name: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            controller: RetryController::new(source.clone(), solver, max_attempts),
            source,
            credentials,
            agent_name: agent_name.into(),
        }
    }

    /// Wire the HTTP task source, configured provider and cargo sandbox.
    pub fn from_config(config: &AppConfig) -> puzzlebot_core::Result<Self> {
        let source = Arc::new(HttpTaskSource::from_config(&config.server)?);
        let provider = router::build_from_config(config)?;
        let sandbox = Arc::new(CargoSandbox::from_config(&config.sandbox));
        let dispatcher = Dispatcher::with_provider(
            provider,
            &config.inference.model,
            sandbox,
            config.sandbox.solution_filter,
        );

        Ok(Self::new(
            source,
            Arc::new(dispatcher),
            CredentialStore::new(&config.credentials_dir),
            &config.agent_name,
            config.max_attempts,
        ))
    }

    /// Stored credentials, registering a new agent when there are none.
    pub async fn ensure_agent(&self) -> puzzlebot_core::Result<AgentCredentials> {
        if let Some(agent) = self.credentials.load()? {
            return Ok(agent);
        }

        let agent = self.source.register(&self.agent_name).await?;
        self.credentials.save(&agent)?;
        info!(agent_id = %agent.id, name = %self.agent_name, "Created agent");
        Ok(agent)
    }

    pub async fn run(&self, options: &RunOptions) -> puzzlebot_core::Result<RunReport> {
        let agent = self.ensure_agent().await?;
        let mut tasks = self.source.list_tasks(&agent).await?;
        info!(count = tasks.len(), "Fetched task list");

        if let Some(only) = &options.task {
            tasks.retain(|t| &t.id == only);
            if tasks.is_empty() {
                warn!(task_id = %only, "Requested task is not in the task list");
            }
        }

        let mut report = RunReport::default();
        for task in &tasks {
            let outcome = self.controller.drive(&agent, task).await;
            report.tasks.push(TaskReport {
                id: task.id.clone(),
                name: task.name.clone(),
                outcome,
            });
        }

        info!(
            solved = report.solved(),
            skipped = report.skipped(),
            exhausted = report.exhausted(),
            attempts = report.attempts(),
            "Run finished"
        );
        Ok(report)
    }
}

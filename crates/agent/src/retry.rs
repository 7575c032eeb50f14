//! Bounded retry of fetch → solve → check per task.

use puzzlebot_core::error::AttemptError;
use puzzlebot_core::source::{AgentCredentials, TaskSource};
use puzzlebot_core::task::{AttemptOutcome, TaskId, TaskOutcome, TaskSummary};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dispatcher::Solver;

/// Drives a single task until it is judged correct or the attempt budget
/// runs out.
///
/// Errors inside an attempt never escape: they are logged and the attempt
/// counts as failed.
pub struct RetryController {
    source: Arc<dyn TaskSource>,
    solver: Arc<dyn Solver>,
    max_attempts: u32,
}

impl RetryController {
    pub fn new(source: Arc<dyn TaskSource>, solver: Arc<dyn Solver>, max_attempts: u32) -> Self {
        Self {
            source,
            solver,
            max_attempts,
        }
    }

    pub async fn drive(&self, agent: &AgentCredentials, task: &TaskSummary) -> TaskOutcome {
        if task.completed {
            info!(task = %task.name, "Task already completed");
            return TaskOutcome::Skipped;
        }

        for attempt in 1..=self.max_attempts {
            info!(
                task = %task.name,
                attempt,
                max_attempts = self.max_attempts,
                "Trying to solve task"
            );

            match self.attempt(agent, &task.id).await {
                Ok(outcome) => {
                    info!(
                        task = %task.name,
                        solution = %outcome.solution,
                        correct = outcome.correct,
                        "Solution checked"
                    );
                    if outcome.correct {
                        return TaskOutcome::Succeeded { attempts: attempt };
                    }
                }
                Err(e) => {
                    warn!(task = %task.name, attempt, error = %e, "Attempt failed");
                }
            }
        }

        warn!(task = %task.name, attempts = self.max_attempts, "Giving up on task");
        TaskOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    async fn attempt(
        &self,
        agent: &AgentCredentials,
        task_id: &TaskId,
    ) -> Result<AttemptOutcome, AttemptError> {
        let detail = self
            .source
            .fetch_task(agent, task_id)
            .await
            .map_err(AttemptError::FetchFailed)?;
        debug!(task_id = %task_id, kind = detail.kind.label(), "Fetched task detail");

        let solution = self.solver.solve(&detail).await?;

        let correct = self
            .source
            .check_solution(agent, task_id, &solution)
            .await
            .map_err(AttemptError::CheckCallFailed)?;

        Ok(AttemptOutcome { solution, correct })
    }
}

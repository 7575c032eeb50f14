//! TaskSource trait: the abstraction over the challenge server.
//!
//! The server hands out tasks per registered agent and judges submitted
//! solutions. Every call is authenticated with the agent's credentials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::TrackerError;
use crate::task::{Solution, TaskDetail, TaskId, TaskSummary};

/// The identity this client holds on the task server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCredentials {
    pub id: String,
    pub token: String,
}

impl std::fmt::Debug for AgentCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCredentials")
            .field("id", &self.id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// The remote source of tasks and judge of solutions.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Register a new agent under `name` and return its credentials.
    async fn register(&self, name: &str) -> std::result::Result<AgentCredentials, TrackerError>;

    /// List all tasks with their completion state for this agent.
    async fn list_tasks(
        &self,
        agent: &AgentCredentials,
    ) -> std::result::Result<Vec<TaskSummary>, TrackerError>;

    /// Fetch the full payload of one task.
    async fn fetch_task(
        &self,
        agent: &AgentCredentials,
        task_id: &TaskId,
    ) -> std::result::Result<TaskDetail, TrackerError>;

    /// Submit a solution and return whether it was judged correct.
    async fn check_solution(
        &self,
        agent: &AgentCredentials,
        task_id: &TaskId,
        solution: &Solution,
    ) -> std::result::Result<bool, TrackerError>;

    /// Health check: is the server up?
    async fn health_check(&self) -> std::result::Result<bool, TrackerError> {
        Ok(true)
    }
}

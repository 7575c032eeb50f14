//! HTTP client for the challenge server.
//!
//! Routes, relative to the configured base URL (which ends in `/api/`):
//! - `POST agent`: register
//! - `GET  agent/{agent_id}/task`: list tasks
//! - `GET  agent/{agent_id}/task/{task_id}`: task detail
//! - `POST agent/{agent_id}/task/{task_id}/check`: judge a solution
//! - `GET  health`
//!
//! The deployment-wide user token travels only in the `Authorization:
//! Bearer` header. The agent token travels only in the `token` query
//! parameter, which is where the server reads it from.

use async_trait::async_trait;
use puzzlebot_config::ServerConfig;
use puzzlebot_core::error::TrackerError;
use puzzlebot_core::source::{AgentCredentials, TaskSource};
use puzzlebot_core::task::{Solution, TaskDetail, TaskId, TaskSummary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A [`TaskSource`] backed by the challenge server's REST API.
pub struct HttpTaskSource {
    base_url: reqwest::Url,
    user_token: Option<String>,
    client: reqwest::Client,
}

impl HttpTaskSource {
    pub fn new(
        base_url: impl Into<String>,
        user_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::Network(format!("HTTP client: {e}")))?;

        let mut raw: String = base_url.into();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = reqwest::Url::parse(&raw)
            .map_err(|e| TrackerError::InvalidUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::InvalidUrl(format!("{raw}: not a base URL")));
        }

        Ok(Self {
            base_url,
            user_token,
            client,
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, TrackerError> {
        Self::new(
            &config.base_url,
            config.user_token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The base URL extended by `segments`, each percent-encoded so an id
    /// containing `/`, `?` or `#` stays a single path segment.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        // Never fails: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.authorized(self.client.get(self.url(segments)))
    }

    fn post(&self, segments: &[&str]) -> reqwest::RequestBuilder {
        self.authorized(self.client.post(self.url(segments)))
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.user_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn map_send_error(e: reqwest::Error) -> TrackerError {
    if e.is_timeout() {
        TrackerError::Timeout(e.to_string())
    } else {
        TrackerError::Network(e.to_string())
    }
}

async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, TrackerError> {
    let response = request.send().await.map_err(map_send_error)?;
    let status = response.status().as_u16();

    if status == 401 || status == 403 {
        return Err(TrackerError::Unauthorized);
    }

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status, body = %body, "Task server returned error");
        return Err(TrackerError::Status { status, body });
    }

    response
        .json()
        .await
        .map_err(|e| TrackerError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn register(&self, name: &str) -> Result<AgentCredentials, TrackerError> {
        debug!(name, "Registering agent");
        let body = RegisterRequest {
            name,
            used_models_and_apis: Vec::new(),
        };
        send_json(self.post(&["agent"]).json(&body)).await
    }

    async fn list_tasks(&self, agent: &AgentCredentials) -> Result<Vec<TaskSummary>, TrackerError> {
        let path = ["agent", agent.id.as_str(), "task"];
        send_json(self.get(&path).query(&[("token", &agent.token)])).await
    }

    async fn fetch_task(
        &self,
        agent: &AgentCredentials,
        task_id: &TaskId,
    ) -> Result<TaskDetail, TrackerError> {
        let path = ["agent", agent.id.as_str(), "task", task_id.as_str()];
        send_json(self.get(&path).query(&[("token", &agent.token)])).await
    }

    async fn check_solution(
        &self,
        agent: &AgentCredentials,
        task_id: &TaskId,
        solution: &Solution,
    ) -> Result<bool, TrackerError> {
        let path = ["agent", agent.id.as_str(), "task", task_id.as_str(), "check"];
        let body = CheckRequest {
            solution: solution.as_str(),
        };
        let response: CheckResponse =
            send_json(self.post(&path).query(&[("token", &agent.token)]).json(&body)).await?;
        Ok(response.correct)
    }

    async fn health_check(&self) -> Result<bool, TrackerError> {
        let response = self.get(&["health"]).send().await.map_err(map_send_error)?;
        Ok(response.status().is_success())
    }
}

// --- Wire types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    name: &'a str,
    used_models_and_apis: Vec<String>,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    solution: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    correct: bool,
}

//! Shared test doubles for the solver pipeline.

use async_trait::async_trait;
use puzzlebot_core::error::{ProviderError, SandboxError, TrackerError};
use puzzlebot_core::provider::{GenerateRequest, GenerateResponse, Provider};
use puzzlebot_core::sandbox::{CodeSandbox, ExecutionOutput};
use puzzlebot_core::source::{AgentCredentials, TaskSource};
use puzzlebot_core::task::{Solution, TaskDetail, TaskId, TaskKind, TaskSummary};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

/// A provider that replays scripted completions in order.
///
/// Once the script is used up, the `repeat` completion is returned on
/// every call. Panics if neither is available.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    repeat: Option<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn completions<I, S>(completions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(completions.into_iter().map(|c| Ok(c.into())).collect())
    }

    pub fn always(completion: &str) -> Self {
        Self {
            repeat: Some(completion.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ProviderError> {
        let model = request.model.clone();
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        let next = self.script.lock().unwrap().pop_front();
        let completion = match (next, &self.repeat) {
            (Some(result), _) => result?,
            (None, Some(repeat)) => repeat.clone(),
            (None, None) => panic!("ScriptedProvider: no completion scripted for call #{call}"),
        };

        Ok(GenerateResponse {
            completion,
            model,
            usage: None,
        })
    }
}

/// A sandbox with a real template file and scripted run results.
pub struct MockSandbox {
    dir: tempfile::TempDir,
    outputs: Mutex<VecDeque<Result<ExecutionOutput, SandboxError>>>,
    runs: Mutex<Vec<(String, String)>>,
}

impl MockSandbox {
    pub fn with_template(template: &str) -> Self {
        let sandbox = Self::without_template();
        let src = sandbox.dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("main_template.rs"), template).unwrap();
        sandbox
    }

    pub fn without_template() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            outputs: Mutex::new(VecDeque::new()),
            runs: Mutex::new(Vec::new()),
        }
    }

    pub fn push_output(&self, output: Result<ExecutionOutput, SandboxError>) {
        self.outputs.lock().unwrap().push_back(output);
    }

    /// Every `(source, input)` pair passed to `run`.
    pub fn runs(&self) -> Vec<(String, String)> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeSandbox for MockSandbox {
    fn name(&self) -> &str {
        "mock"
    }

    fn template_path(&self) -> PathBuf {
        self.dir.path().join("src").join("main_template.rs")
    }

    async fn run(&self, source: &str, input: &str) -> Result<ExecutionOutput, SandboxError> {
        self.runs
            .lock()
            .unwrap()
            .push((source.to_string(), input.to_string()));
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ExecutionOutput::default()))
    }
}

/// An in-memory task server.
///
/// Verdicts are consumed in order; once they run out every check is
/// judged incorrect.
#[derive(Default)]
pub struct MockTaskSource {
    tasks: Vec<TaskSummary>,
    details: HashMap<TaskId, TaskDetail>,
    verdicts: Mutex<VecDeque<Result<bool, TrackerError>>>,
    fetch_errors: Mutex<VecDeque<TrackerError>>,
    list_error: Option<TrackerError>,
    register_error: Option<TrackerError>,
    registrations: Mutex<Vec<String>>,
    fetches: Mutex<Vec<TaskId>>,
    submissions: Mutex<Vec<(TaskId, Solution)>>,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, summary: TaskSummary, detail: TaskDetail) -> Self {
        self.details.insert(summary.id.clone(), detail);
        self.tasks.push(summary);
        self
    }

    pub fn with_verdicts(self, verdicts: impl IntoIterator<Item = bool>) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .extend(verdicts.into_iter().map(Ok));
        self
    }

    pub fn with_check_error(self, error: TrackerError) -> Self {
        self.verdicts.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_fetch_error(self, error: TrackerError) -> Self {
        self.fetch_errors.lock().unwrap().push_back(error);
        self
    }

    pub fn with_list_error(mut self, error: TrackerError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn with_register_error(mut self, error: TrackerError) -> Self {
        self.register_error = Some(error);
        self
    }

    pub fn registrations(&self) -> Vec<String> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn submissions(&self) -> Vec<(TaskId, Solution)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn register(&self, name: &str) -> Result<AgentCredentials, TrackerError> {
        if let Some(err) = &self.register_error {
            return Err(err.clone());
        }
        self.registrations.lock().unwrap().push(name.to_string());
        Ok(test_agent())
    }

    async fn list_tasks(&self, _agent: &AgentCredentials) -> Result<Vec<TaskSummary>, TrackerError> {
        match &self.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.tasks.clone()),
        }
    }

    async fn fetch_task(
        &self,
        _agent: &AgentCredentials,
        task_id: &TaskId,
    ) -> Result<TaskDetail, TrackerError> {
        self.fetches.lock().unwrap().push(task_id.clone());
        if let Some(err) = self.fetch_errors.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.details.get(task_id).cloned().ok_or(TrackerError::Status {
            status: 404,
            body: format!("no task {task_id}"),
        })
    }

    async fn check_solution(
        &self,
        _agent: &AgentCredentials,
        task_id: &TaskId,
        solution: &Solution,
    ) -> Result<bool, TrackerError> {
        self.submissions
            .lock()
            .unwrap()
            .push((task_id.clone(), solution.clone()));
        self.verdicts.lock().unwrap().pop_front().unwrap_or(Ok(false))
    }
}

pub fn test_agent() -> AgentCredentials {
    AgentCredentials {
        id: "agent-1".into(),
        token: "token-1".into(),
    }
}

pub fn summary(id: &str, completed: bool) -> TaskSummary {
    TaskSummary {
        id: TaskId::from(id),
        name: format!("task {id}"),
        completed,
        time: completed.then_some(1_717_000_000),
    }
}

pub fn plain_detail(description: &str) -> TaskDetail {
    TaskDetail {
        name: "riddle".into(),
        kind: TaskKind::PlainQuestion {
            description: description.into(),
        },
    }
}

pub fn unknown_detail(tag: &str) -> TaskDetail {
    TaskDetail {
        name: "mystery".into(),
        kind: TaskKind::Unknown { tag: tag.into() },
    }
}

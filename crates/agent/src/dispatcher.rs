//! Routing a task to the strategy that handles its kind.

use async_trait::async_trait;
use puzzlebot_config::SolutionFilter;
use puzzlebot_core::error::AttemptError;
use puzzlebot_core::provider::Provider;
use puzzlebot_core::sandbox::CodeSandbox;
use puzzlebot_core::task::{CodePart, Solution, TaskDetail, TaskKind};
use std::sync::Arc;
use tracing::debug;

use crate::strategy::{GeneratedCodeStrategy, PlainQuestionStrategy};

/// Produces a candidate solution for a fetched task.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(&self, detail: &TaskDetail) -> Result<Solution, AttemptError>;
}

/// The [`Solver`] that picks a strategy by [`TaskKind`].
pub struct Dispatcher {
    plain: PlainQuestionStrategy,
    code: GeneratedCodeStrategy,
}

impl Dispatcher {
    pub fn new(plain: PlainQuestionStrategy, code: GeneratedCodeStrategy) -> Self {
        Self { plain, code }
    }

    /// Both strategies sharing one provider and model.
    pub fn with_provider(
        provider: Arc<dyn Provider>,
        model: &str,
        sandbox: Arc<dyn CodeSandbox>,
        filter: SolutionFilter,
    ) -> Self {
        Self::new(
            PlainQuestionStrategy::new(provider.clone(), model),
            GeneratedCodeStrategy::new(provider, model, sandbox, filter),
        )
    }
}

#[async_trait]
impl Solver for Dispatcher {
    async fn solve(&self, detail: &TaskDetail) -> Result<Solution, AttemptError> {
        debug!(task = %detail.name, kind = detail.kind.label(), "Dispatching task");

        match &detail.kind {
            TaskKind::PlainQuestion { description } => self.plain.solve(description).await,
            TaskKind::GeneratedCodePartOne { description, input } => {
                self.code.solve(CodePart::One, description, input).await
            }
            TaskKind::GeneratedCodePartTwo { description, input } => {
                self.code.solve(CodePart::Two, description, input).await
            }
            TaskKind::Unknown { tag } => Err(AttemptError::UnsupportedTaskKind(tag.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockSandbox, ScriptedProvider, plain_detail, unknown_detail};
    use puzzlebot_core::sandbox::ExecutionOutput;

    fn dispatcher(provider: Arc<ScriptedProvider>, sandbox: Arc<MockSandbox>) -> Dispatcher {
        Dispatcher::with_provider(provider, "m", sandbox, SolutionFilter::Digits)
    }

    #[tokio::test]
    async fn plain_question_goes_to_model() {
        let provider = Arc::new(ScriptedProvider::completions(["`yes`"]));
        let sandbox = Arc::new(MockSandbox::without_template());

        let solution = dispatcher(provider.clone(), sandbox.clone())
            .solve(&plain_detail("Is water wet?"))
            .await
            .unwrap();

        assert_eq!(solution.as_str(), "yes");
        assert!(sandbox.runs().is_empty());
    }

    #[tokio::test]
    async fn code_parts_go_to_sandbox() {
        let provider = Arc::new(ScriptedProvider::always("```rust\nfn main() {}\n```"));
        let sandbox = Arc::new(MockSandbox::with_template("fn main() {}"));
        sandbox.push_output(Ok(ExecutionOutput {
            stdout: "11\n".into(),
            ..Default::default()
        }));
        sandbox.push_output(Ok(ExecutionOutput {
            stdout: "22\n".into(),
            ..Default::default()
        }));
        let dispatcher = dispatcher(provider.clone(), sandbox.clone());

        let one = TaskDetail {
            name: "day1".into(),
            kind: TaskKind::GeneratedCodePartOne {
                description: "p1".into(),
                input: "in1".into(),
            },
        };
        let two = TaskDetail {
            name: "day1-2".into(),
            kind: TaskKind::GeneratedCodePartTwo {
                description: "p2".into(),
                input: "in2".into(),
            },
        };

        assert_eq!(dispatcher.solve(&one).await.unwrap().as_str(), "11");
        assert_eq!(dispatcher.solve(&two).await.unwrap().as_str(), "22");

        let inputs: Vec<String> = sandbox.runs().into_iter().map(|(_, input)| input).collect();
        assert_eq!(inputs, vec!["in1", "in2"]);
        let prompts = provider.requests();
        assert!(!prompts[0].prompt.contains("\"Part Two\""));
        assert!(prompts[1].prompt.contains("\"Part Two\""));
    }

    #[tokio::test]
    async fn unknown_kind_is_unsupported() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let sandbox = Arc::new(MockSandbox::without_template());

        let err = dispatcher(provider.clone(), sandbox)
            .solve(&unknown_detail("RiddleOfTheSphinx"))
            .await
            .unwrap_err();

        assert!(matches!(err, AttemptError::UnsupportedTaskKind(ref tag) if tag == "RiddleOfTheSphinx"));
        assert_eq!(provider.call_count(), 0);
    }
}

//! Solver strategies, one per family of task kinds.
//!
//! A strategy turns a task description into a [`Solution`]. Completions
//! that cannot be parsed are not errors: they degrade to the sentinel
//! answer so the attempt still reaches the checker.

use puzzlebot_config::SolutionFilter;
use puzzlebot_core::error::AttemptError;
use puzzlebot_core::provider::{GenerateRequest, Provider};
use puzzlebot_core::sandbox::CodeSandbox;
use puzzlebot_core::task::{CodePart, Solution};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{extract, prompt};

/// Answers a question directly from the model's completion.
pub struct PlainQuestionStrategy {
    provider: Arc<dyn Provider>,
    model: String,
}

impl PlainQuestionStrategy {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub async fn solve(&self, description: &str) -> Result<Solution, AttemptError> {
        let request = GenerateRequest::new(&self.model, prompt::plain_question(description));
        let response = self.provider.generate(request).await?;

        match extract::backtick_answer(&response.completion) {
            Some(answer) => Ok(Solution::new(answer)),
            None => Ok(degrade(AttemptError::MalformedCompletion(
                "fewer than two backticks in completion".into(),
            ))),
        }
    }
}

/// Asks the model for a program and runs it against the task input.
pub struct GeneratedCodeStrategy {
    provider: Arc<dyn Provider>,
    model: String,
    sandbox: Arc<dyn CodeSandbox>,
    filter: SolutionFilter,
}

impl GeneratedCodeStrategy {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        sandbox: Arc<dyn CodeSandbox>,
        filter: SolutionFilter,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            sandbox,
            filter,
        }
    }

    pub async fn solve(
        &self,
        part: CodePart,
        description: &str,
        input: &str,
    ) -> Result<Solution, AttemptError> {
        let template = self.read_template().await?;
        let prompt = prompt::generated_code(part, &template, description);

        let response = self
            .provider
            .generate(GenerateRequest::new(&self.model, prompt))
            .await?;

        let Some(code) = extract::code_block(&response.completion) else {
            return Ok(degrade(AttemptError::MalformedCompletion(
                "no ```rust block in completion".into(),
            )));
        };

        info!(sandbox = self.sandbox.name(), "Running generated code");
        let output = self.sandbox.run(code, input).await?;

        let solution = extract::apply_filter(&output.stdout, self.filter);
        debug!(stdout = %output.stdout.trim(), solution = %solution, "Program output");
        Ok(Solution::new(solution))
    }

    async fn read_template(&self) -> Result<String, AttemptError> {
        let path = self.sandbox.template_path();
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AttemptError::TemplateUnavailable {
                path,
                reason: e.to_string(),
            })
    }
}

fn degrade(err: AttemptError) -> Solution {
    warn!(error = %err, "Submitting sentinel answer");
    Solution::sentinel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockSandbox, ScriptedProvider};
    use puzzlebot_core::error::{ProviderError, SandboxError};
    use puzzlebot_core::sandbox::ExecutionOutput;

    fn plain(provider: &Arc<ScriptedProvider>) -> PlainQuestionStrategy {
        PlainQuestionStrategy::new(provider.clone(), "test-model")
    }

    fn code(
        provider: &Arc<ScriptedProvider>,
        sandbox: &Arc<MockSandbox>,
        filter: SolutionFilter,
    ) -> GeneratedCodeStrategy {
        GeneratedCodeStrategy::new(provider.clone(), "test-model", sandbox.clone(), filter)
    }

    #[tokio::test]
    async fn plain_answer_is_extracted() {
        let provider = Arc::new(ScriptedProvider::completions(["... the answer is `42` done"]));
        let solution = plain(&provider).solve("6*7?").await.unwrap();
        assert_eq!(solution.as_str(), "42");

        let requests = provider.requests();
        assert_eq!(requests[0].model, "test-model");
        assert!(requests[0].prompt.ends_with("The task is: 6*7?"));
    }

    #[tokio::test]
    async fn plain_without_backticks_is_sentinel() {
        let provider = Arc::new(ScriptedProvider::completions(["I think it is 42."]));
        let solution = plain(&provider).solve("6*7?").await.unwrap();
        assert!(solution.is_sentinel());
    }

    #[tokio::test]
    async fn plain_provider_failure_is_inference_error() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Timeout(
            "600s".into(),
        ))]));
        let err = plain(&provider).solve("6*7?").await.unwrap_err();
        assert!(matches!(err, AttemptError::InferenceCallFailed(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn code_is_run_and_filtered() {
        let sandbox = Arc::new(MockSandbox::with_template("fn main() { /* TEMPLATE */ }"));
        sandbox.push_output(Ok(ExecutionOutput {
            stdout: "Result: 1,337\n".into(),
            stderr: "warning: unused variable".into(),
            exit_code: Some(0),
        }));
        let provider = Arc::new(ScriptedProvider::completions([
            "Sure!\n```rust\nfn main() { println!(\"1337\"); }\n```\nHope it helps.",
        ]));

        let solution = code(&provider, &sandbox, SolutionFilter::Digits)
            .solve(CodePart::One, "Count things.", "a\nb\n")
            .await
            .unwrap();

        assert_eq!(solution.as_str(), "1337");
        let runs = sandbox.runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "fn main() { println!(\"1337\"); }");
        assert_eq!(runs[0].1, "a\nb\n");
        assert!(provider.requests()[0].prompt.contains("/* TEMPLATE */"));
    }

    #[tokio::test]
    async fn raw_filter_keeps_text() {
        let sandbox = Arc::new(MockSandbox::with_template("fn main() {}"));
        sandbox.push_output(Ok(ExecutionOutput {
            stdout: " abc-12 \n".into(),
            ..Default::default()
        }));
        let provider = Arc::new(ScriptedProvider::completions(["```rust\nx\n```"]));

        let solution = code(&provider, &sandbox, SolutionFilter::Raw)
            .solve(CodePart::Two, "d", "i")
            .await
            .unwrap();
        assert_eq!(solution.as_str(), "abc-12");
    }

    #[tokio::test]
    async fn part_two_prompt_is_restricted() {
        let sandbox = Arc::new(MockSandbox::with_template("fn main() {}"));
        sandbox.push_output(Ok(ExecutionOutput::default()));
        let provider = Arc::new(ScriptedProvider::completions(["```rust\nx\n```"]));

        code(&provider, &sandbox, SolutionFilter::Digits)
            .solve(CodePart::Two, "d", "i")
            .await
            .unwrap();
        assert!(provider.requests()[0].prompt.contains("\"Part Two\""));
    }

    #[tokio::test]
    async fn missing_fence_skips_sandbox() {
        let sandbox = Arc::new(MockSandbox::with_template("fn main() {}"));
        let provider = Arc::new(ScriptedProvider::completions(["I would write a loop."]));

        let solution = code(&provider, &sandbox, SolutionFilter::Digits)
            .solve(CodePart::One, "d", "i")
            .await
            .unwrap();

        assert!(solution.is_sentinel());
        assert!(sandbox.runs().is_empty());
    }

    #[tokio::test]
    async fn missing_template_skips_inference() {
        let sandbox = Arc::new(MockSandbox::without_template());
        let provider = Arc::new(ScriptedProvider::completions(["```rust\nx\n```"]));

        let err = code(&provider, &sandbox, SolutionFilter::Digits)
            .solve(CodePart::One, "d", "i")
            .await
            .unwrap_err();

        assert!(matches!(err, AttemptError::TemplateUnavailable { .. }));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn sandbox_failure_is_execution_error() {
        let sandbox = Arc::new(MockSandbox::with_template("fn main() {}"));
        sandbox.push_output(Err(SandboxError::Timeout { timeout_secs: 300 }));
        let provider = Arc::new(ScriptedProvider::completions(["```rust\nloop {}\n```"]));

        let err = code(&provider, &sandbox, SolutionFilter::Digits)
            .solve(CodePart::One, "d", "i")
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::ExecutionFailed(SandboxError::Timeout { .. })));
    }
}

//! CodeSandbox trait: where generated programs are built and run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::error::SandboxError;

/// Captured result of one build-and-run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,

    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ExecutionOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Builds and runs generated source against an input payload.
///
/// Compiler and runtime errors are reported through `stderr` and
/// `exit_code`, not as `Err`. `Err` means the sandbox itself could not do
/// its job (files not writable, command missing, timeout).
#[async_trait]
pub trait CodeSandbox: Send + Sync {
    fn name(&self) -> &str;

    /// The template source embedded into code-generation prompts.
    fn template_path(&self) -> PathBuf;

    /// Persist `source` and `input`, then build and run.
    async fn run(
        &self,
        source: &str,
        input: &str,
    ) -> std::result::Result<ExecutionOutput, SandboxError>;
}

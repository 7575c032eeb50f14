//! Cargo sandbox: build and run generated code in a sibling project.
//!
//! Each run overwrites `src/main.rs` and `input.txt` in the project
//! directory, then executes the configured command there (by default
//! `cargo run`) under a timeout.
//!
//! On unix the command leads its own process group. A timeout kills the
//! whole group, so the program `cargo run` started dies with it, and the
//! leader is reaped before `run` returns.

use async_trait::async_trait;
use puzzlebot_config::SandboxConfig;
use puzzlebot_core::error::SandboxError;
use puzzlebot_core::sandbox::{CodeSandbox, ExecutionOutput};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const TEMPLATE_FILE: &str = "src/main_template.rs";
const MAIN_FILE: &str = "src/main.rs";
const INPUT_FILE: &str = "input.txt";
const REAP_GRACE: Duration = Duration::from_secs(5);

/// Runs generated programs inside a Cargo project on disk.
pub struct CargoSandbox {
    project_dir: PathBuf,
    command: Vec<String>,
    timeout_secs: u64,
}

impl CargoSandbox {
    pub fn new(project_dir: impl Into<PathBuf>, command: Vec<String>, timeout_secs: u64) -> Self {
        Self {
            project_dir: project_dir.into(),
            command,
            timeout_secs,
        }
    }

    pub fn from_config(config: &SandboxConfig) -> Self {
        Self::new(
            config.project_dir.clone(),
            config.command.clone(),
            config.timeout_secs,
        )
    }

    fn command_line(&self) -> String {
        self.command.join(" ")
    }

    async fn write_workspace_file(&self, relative: &str, contents: &str) -> Result<(), SandboxError> {
        let path = self.project_dir.join(relative);
        let workspace_err = |e: std::io::Error| SandboxError::Workspace {
            path: path.clone(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(workspace_err)?;
        }
        tokio::fs::write(&path, contents).await.map_err(workspace_err)
    }
}

#[async_trait]
impl CodeSandbox for CargoSandbox {
    fn name(&self) -> &str {
        "cargo"
    }

    fn template_path(&self) -> PathBuf {
        self.project_dir.join(TEMPLATE_FILE)
    }

    async fn run(&self, source: &str, input: &str) -> Result<ExecutionOutput, SandboxError> {
        self.write_workspace_file(MAIN_FILE, source).await?;
        self.write_workspace_file(INPUT_FILE, input).await?;

        let Some((program, args)) = self.command.split_first() else {
            return Err(SandboxError::Spawn {
                command: String::new(),
                reason: "empty command".into(),
            });
        };

        debug!(command = %self.command_line(), dir = %self.project_dir.display(), "Running generated code");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| SandboxError::Spawn {
            command: self.command_line(),
            reason: e.to_string(),
        })?;
        let pgid = child.id();

        let wait = child.wait_with_output();
        tokio::pin!(wait);

        let output = match tokio::time::timeout(Duration::from_secs(self.timeout_secs), &mut wait).await {
            Ok(output) => output.map_err(|e| SandboxError::Spawn {
                command: self.command_line(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                warn!(timeout_secs = self.timeout_secs, "Generated code timed out, killing it");
                kill_process_group(pgid);
                // Dropping the wait future kills the leader if it is still alive.
                if tokio::time::timeout(REAP_GRACE, wait).await.is_err() {
                    warn!("Timed-out command did not exit after kill");
                }
                return Err(SandboxError::Timeout {
                    timeout_secs: self.timeout_secs,
                });
            }
        };

        let result = ExecutionOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };

        if !result.stderr.trim().is_empty() {
            warn!(stderr = %result.stderr.trim(), "Generated code wrote to stderr");
        }
        if !result.success() {
            warn!(exit_code = ?result.exit_code, "Generated code exited unsuccessfully");
        }

        Ok(result)
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: Option<u32>) {
    let Some(pgid) = pgid.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group was created by this spawn.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc != 0 {
        warn!(pgid, error = %std::io::Error::last_os_error(), "Could not kill process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: Option<u32>) {}

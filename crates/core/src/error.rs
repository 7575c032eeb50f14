//! Error types for the puzzlebot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`AttemptError`] is the
//! union the retry controller matches on for a single solve→check cycle.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for puzzlebot operations that may end a run.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Task server errors ---
    #[error("Task server error: {0}")]
    Tracker(#[from] TrackerError),

    // --- Credential errors ---
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    // --- Sandbox errors ---
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum TrackerError {
    #[error("Invalid task server URL: {0}")]
    InvalidUrl(String),

    #[error("Task server rejected credentials")]
    Unauthorized,

    #[error("Task server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from task server: {0}")]
    InvalidResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Failed to read credential file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write credential file {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Failed to prepare {path}: {reason}")]
    Workspace { path: PathBuf, reason: String },

    #[error("Failed to start `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("Execution timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Everything that can go wrong inside one solve→check cycle.
///
/// None of these end a run. The retry controller logs them and counts the
/// attempt as failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Unsupported task kind: {0}")]
    UnsupportedTaskKind(String),

    #[error("Template unavailable at {path}: {reason}")]
    TemplateUnavailable { path: PathBuf, reason: String },

    #[error("Inference call failed: {0}")]
    InferenceCallFailed(#[from] ProviderError),

    #[error("Fetching task detail failed: {0}")]
    FetchFailed(TrackerError),

    #[error("Solution check failed: {0}")]
    CheckCallFailed(TrackerError),

    #[error("Malformed completion: {0}")]
    MalformedCompletion(String),

    #[error("Code execution failed: {0}")]
    ExecutionFailed(#[from] SandboxError),
}

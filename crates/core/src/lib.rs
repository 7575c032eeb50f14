//! # puzzlebot Core
//!
//! Domain types, traits, and error definitions for the puzzlebot task solver.
//! This crate has **no HTTP or process dependencies**: it defines the domain
//! model that all other crates implement against.
//!
//! Every external collaborator is a trait here:
//! - [`Provider`]: the language model
//! - [`TaskSource`]: the challenge server
//! - [`CodeSandbox`]: the project that builds and runs generated code
//!
//! Implementations live in their respective crates, and tests swap them for
//! in-memory stubs.

pub mod error;
pub mod provider;
pub mod sandbox;
pub mod source;
pub mod task;

// Re-export key types at crate root for ergonomics
pub use error::{AttemptError, Error, Result};
pub use provider::{GenerateRequest, GenerateResponse, Provider, Usage};
pub use sandbox::{CodeSandbox, ExecutionOutput};
pub use source::{AgentCredentials, TaskSource};
pub use task::{
    AttemptOutcome, CodePart, SENTINEL_SOLUTION, Solution, TaskDetail, TaskId, TaskKind,
    TaskOutcome, TaskSummary,
};

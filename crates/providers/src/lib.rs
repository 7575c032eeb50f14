//! Inference provider implementations for puzzlebot.
//!
//! All providers implement the `puzzlebot_core::Provider` trait.
//! [`router::build_from_config`] selects one based on configuration.

pub mod diagnostics;
pub mod ollama;
pub mod openai_compat;
pub mod router;

pub use diagnostics::DiagnosticsDump;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;

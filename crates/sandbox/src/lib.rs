//! # puzzlebot Sandbox
//!
//! [`CodeSandbox`](puzzlebot_core::CodeSandbox) implementations. The only
//! one is [`CargoSandbox`], which drives a sibling Cargo project.

pub mod cargo;

pub use cargo::CargoSandbox;

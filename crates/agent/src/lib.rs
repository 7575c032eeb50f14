//! The solving pipeline of puzzlebot.
//!
//! For every task the bot runs a bounded loop:
//!
//! 1. **Fetch** the task detail from the task server
//! 2. **Dispatch** on the task kind to a solver strategy
//! 3. **Solve**: prompt the model, and for code tasks build and run the
//!    generated program in the sandbox project
//! 4. **Check** the solution with the task server
//!
//! The loop stops at the first correct answer or after `max_attempts`.

pub mod dispatcher;
pub mod extract;
pub mod prompt;
pub mod retry;
pub mod runner;
pub mod strategy;

#[cfg(test)]
mod test_helpers;

pub use dispatcher::{Dispatcher, Solver};
pub use retry::RetryController;
pub use runner::{Bot, RunOptions, RunReport, TaskReport};
pub use strategy::{GeneratedCodeStrategy, PlainQuestionStrategy};

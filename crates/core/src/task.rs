//! Task domain types.
//!
//! A task is listed as a [`TaskSummary`], then fetched in full as a
//! [`TaskDetail`] whose [`TaskKind`] decides which solver handles it.
//! The server encodes the kind as an externally tagged object under
//! `taskType`; unknown tags are kept as [`TaskKind::Unknown`] instead of
//! failing deserialization so a single odd task cannot break a run.

use serde::{Deserialize, Serialize};

/// The literal answer submitted when nothing usable could be extracted.
pub const SENTINEL_SOLUTION: &str = "no idea";

/// Opaque task identifier assigned by the task server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the task listing for an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,

    /// Unix timestamp of the completion, present once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

/// Which half of a two-part code challenge a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePart {
    One,
    Two,
}

/// The closed set of task kinds the solver understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// A question answered directly by the model.
    PlainQuestion { description: String },

    /// First half of a code challenge: the model writes a program that is
    /// run against `input`.
    GeneratedCodePartOne { description: String, input: String },

    /// Second half of a code challenge.
    GeneratedCodePartTwo { description: String, input: String },

    /// Any kind this client does not know how to solve.
    Unknown { tag: String },
}

impl TaskKind {
    /// The wire tag of this kind, used in logs.
    pub fn label(&self) -> &str {
        match self {
            TaskKind::PlainQuestion { .. } => "SimpleTask",
            TaskKind::GeneratedCodePartOne { .. } => "AdventOfCodePartOne",
            TaskKind::GeneratedCodePartTwo { .. } => "AdventOfCodePartTwo",
            TaskKind::Unknown { tag } => tag,
        }
    }
}

/// The full payload of a single task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireTaskDetail")]
pub struct TaskDetail {
    pub name: String,
    pub kind: TaskKind,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTaskDetail {
    name: String,
    task_type: WireTaskType,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTaskType {
    Known(KnownTaskType),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
enum KnownTaskType {
    SimpleTask { description: String },
    AdventOfCodePartOne { description: String, input: String },
    AdventOfCodePartTwo { description: String, input: String },
}

impl From<WireTaskDetail> for TaskDetail {
    fn from(wire: WireTaskDetail) -> Self {
        let kind = match wire.task_type {
            WireTaskType::Known(KnownTaskType::SimpleTask { description }) => {
                TaskKind::PlainQuestion { description }
            }
            WireTaskType::Known(KnownTaskType::AdventOfCodePartOne { description, input }) => {
                TaskKind::GeneratedCodePartOne { description, input }
            }
            WireTaskType::Known(KnownTaskType::AdventOfCodePartTwo { description, input }) => {
                TaskKind::GeneratedCodePartTwo { description, input }
            }
            WireTaskType::Other(value) => TaskKind::Unknown {
                tag: unknown_tag(&value),
            },
        };

        Self {
            name: wire.name,
            kind,
        }
    }
}

fn unknown_tag(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| "<empty>".into()),
        other => format!("<{}>", json_type_name(other)),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A candidate answer submitted for checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution(String);

impl Solution {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The placeholder submitted when extraction fails.
    pub fn sentinel() -> Self {
        Self(SENTINEL_SOLUTION.to_string())
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == SENTINEL_SOLUTION
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one solve→check cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub solution: Solution,
    pub correct: bool,
}

/// Final state of a task after the retry controller is done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The server already reported the task as completed.
    Skipped,
    /// A check returned `correct == true` on attempt number `attempts`.
    Succeeded { attempts: u32 },
    /// All attempts were used without a correct answer.
    Exhausted { attempts: u32 },
}

impl TaskOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, TaskOutcome::Succeeded { .. })
    }

    /// Number of solve→check cycles that were run.
    pub fn attempts(&self) -> u32 {
        match self {
            TaskOutcome::Skipped => 0,
            TaskOutcome::Succeeded { attempts } | TaskOutcome::Exhausted { attempts } => *attempts,
        }
    }
}

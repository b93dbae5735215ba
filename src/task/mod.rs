//! Task and task result model.
//!
//! A [`Task`] is the unit of work submitted to the sprint scheduler. Tasks are
//! immutable once submitted; the scheduler produces exactly one
//! [`TaskResult`] per task.
//!
//! # Sprint File Format
//!
//! Batches are usually loaded from a YAML sprint file:
//!
//! ```text
//! name: Sprint 12
//! tasks:
//!   - id: API-1
//!     type: implement_feature
//!     description: Add the orders endpoint
//!     requirements:
//!       - Paginate results
//!     test_requirements:
//!       coverage: 80
//!     acceptance_criteria:
//!       - GET /orders returns 200
//!     tech_constraints: [rust, postgres]
//!   - id: API-2
//!     type: write_tests
//!     depends_on: [API-1]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

mod io;

pub use io::SprintFile;

/// Kind of engineering work a task requests.
///
/// `Any` is only meaningful in an agent's declared capabilities, where it
/// matches every task type. Sprint files reject it as a concrete task type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    ImplementFeature,
    FixBug,
    WriteTests,
    ReviewCode,
    Refactor,
    WriteDocs,
    EstimateStory,
    AnalyzeCodebase,
    DesignArchitecture,
    Deploy,
    /// Wildcard capability.
    Any,
}

impl TaskType {
    /// Every concrete (non-wildcard) task type.
    pub const CONCRETE: &'static [TaskType] = &[
        TaskType::ImplementFeature,
        TaskType::FixBug,
        TaskType::WriteTests,
        TaskType::ReviewCode,
        TaskType::Refactor,
        TaskType::WriteDocs,
        TaskType::EstimateStory,
        TaskType::AnalyzeCodebase,
        TaskType::DesignArchitecture,
        TaskType::Deploy,
    ];

    /// The snake_case tag used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::ImplementFeature => "implement_feature",
            TaskType::FixBug => "fix_bug",
            TaskType::WriteTests => "write_tests",
            TaskType::ReviewCode => "review_code",
            TaskType::Refactor => "refactor",
            TaskType::WriteDocs => "write_docs",
            TaskType::EstimateStory => "estimate_story",
            TaskType::AnalyzeCodebase => "analyze_codebase",
            TaskType::DesignArchitecture => "design_architecture",
            TaskType::Deploy => "deploy",
            TaskType::Any => "any",
        }
    }

    /// Parse a snake_case tag.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::CONCRETE
            .iter()
            .chain(std::iter::once(&TaskType::Any))
            .copied()
            .find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of requested engineering work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier, unique within a batch.
    pub id: String,

    /// Kind of work requested.
    #[serde(rename = "type")]
    pub task_type: TaskType,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Ordered requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,

    /// Named test constraints, e.g. `coverage: 80`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub test_requirements: BTreeMap<String, Value>,

    /// Ordered acceptance criteria.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<String>,

    /// Technology tags. Empty means any technology is acceptable.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tech_constraints: BTreeSet<String>,

    /// Identifiers of tasks in the same batch that must finish first.
    ///
    /// Kept as an ordered list so "blocked by" messages pick the same failed
    /// task on every run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Task {
    /// Create a task with no constraints or dependencies.
    pub fn new(id: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: id.into(),
            task_type,
            description: String::new(),
            requirements: Vec::new(),
            test_requirements: BTreeMap::new(),
            acceptance_criteria: Vec::new(),
            tech_constraints: BTreeSet::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tech<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tech_constraints = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn depending_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Comma-separated technology tags for messages, or `(any)`.
    pub fn tech_display(&self) -> String {
        if self.tech_constraints.is_empty() {
            "(any)".to_string()
        } else {
            self.tech_constraints
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Outcome of one submitted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,

    /// The agent the task was delegated to; `None` when delegation failed or
    /// the task was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    pub success: bool,

    pub message: String,

    /// Executor-defined structured output.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, Value>,
}

/// Message prefix for results of tasks skipped because a predecessor failed.
pub const BLOCKED_PREFIX: &str = "blocked by failed dependency: ";

impl TaskResult {
    /// A successful result from `agent_id`.
    pub fn succeeded(
        task_id: impl Into<String>,
        agent_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            agent_id: Some(agent_id.into()),
            success: true,
            message: message.into(),
            artifacts: BTreeMap::new(),
        }
    }

    /// An unsuccessful result. `agent_id` is `None` when no agent was involved.
    pub fn failed(
        task_id: impl Into<String>,
        agent_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            agent_id,
            success: false,
            message: message.into(),
            artifacts: BTreeMap::new(),
        }
    }

    /// A result for a task that was never submitted because `dependency` failed.
    pub fn blocked(task_id: impl Into<String>, dependency: &str) -> Self {
        Self::failed(task_id, None, format!("{}{}", BLOCKED_PREFIX, dependency))
    }

    pub fn with_artifact(mut self, key: impl Into<String>, value: Value) -> Self {
        self.artifacts.insert(key.into(), value);
        self
    }

    /// Whether this result was produced without running the task.
    pub fn is_blocked(&self) -> bool {
        !self.success && self.agent_id.is_none() && self.message.starts_with(BLOCKED_PREFIX)
    }
}

//! Sprint file loading.

use super::{Task, TaskType};
use crate::error::{Result, SprintError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

/// A batch of tasks as written in a sprint file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintFile {
    /// Optional human-readable sprint name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub tasks: Vec<TaskEntry>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A task as written in a sprint file; the identifier may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub test_requirements: BTreeMap<String, Value>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub tech_constraints: BTreeSet<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl SprintFile {
    /// Load a sprint file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SprintError::UserError(format!(
                "failed to read sprint file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a sprint file from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| SprintError::UserError(format!("failed to parse sprint file: {}", e)))
    }

    /// Convert entries into tasks, generating `TASK-NNN` identifiers for
    /// entries without one.
    ///
    /// Generated identifiers never collide with identifiers supplied in the
    /// file. Entries typed `any` are rejected. Technology tags are trimmed and
    /// blank tags dropped.
    pub fn into_tasks(self) -> Result<Vec<Task>> {
        let mut taken: HashSet<String> = self
            .tasks
            .iter()
            .filter_map(|e| e.id.clone())
            .collect();
        let mut next = 1u32;

        let mut tasks = Vec::with_capacity(self.tasks.len());
        for (index, entry) in self.tasks.into_iter().enumerate() {
            if entry.task_type == TaskType::Any {
                return Err(SprintError::UserError(format!(
                    "task #{} ('{}') uses the wildcard type 'any'; pick a concrete task type",
                    index + 1,
                    entry.id.as_deref().unwrap_or("<unnamed>")
                )));
            }

            let id = match entry.id {
                Some(id) if id.trim().is_empty() => {
                    return Err(SprintError::UserError(format!(
                        "task #{} has an empty id",
                        index + 1
                    )));
                }
                Some(id) => id,
                None => loop {
                    let candidate = format!("TASK-{:03}", next);
                    next += 1;
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                },
            };

            tasks.push(Task {
                id,
                task_type: entry.task_type,
                description: entry.description,
                requirements: entry.requirements,
                test_requirements: entry.test_requirements,
                acceptance_criteria: entry.acceptance_criteria,
                tech_constraints: normalize_tags(entry.tech_constraints),
                depends_on: entry.depends_on,
            });
        }

        Ok(tasks)
    }
}

fn normalize_tags(tags: BTreeSet<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

//! Agent capability registry.
//!
//! The registry is built once per scheduling session and never mutated;
//! reloading the roster means building a new registry.

use crate::task::TaskType;
use std::collections::{BTreeMap, BTreeSet};

/// Declared capabilities of one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    pub id: String,
    /// Accepted task types; [`TaskType::Any`] accepts all.
    pub task_types: BTreeSet<TaskType>,
    /// Technology tags; empty accepts all.
    pub technologies: BTreeSet<String>,
    pub enabled: bool,
}

impl AgentDescriptor {
    pub fn new<T, S>(id: impl Into<String>, task_types: T, technologies: S) -> Self
    where
        T: IntoIterator<Item = TaskType>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            id: id.into(),
            task_types: task_types.into_iter().collect(),
            technologies: technologies.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether the agent accepts `task_type`.
    pub fn supports_type(&self, task_type: TaskType) -> bool {
        self.task_types.contains(&TaskType::Any) || self.task_types.contains(&task_type)
    }

    /// Whether the agent's technologies are compatible with `tags`.
    ///
    /// Either side being empty is a wildcard match.
    pub fn supports_tech(&self, tags: &BTreeSet<String>) -> bool {
        tags.is_empty()
            || self.technologies.is_empty()
            || !self.technologies.is_disjoint(tags)
    }

    /// Whether the agent would be considered for a task at all.
    pub fn is_eligible(&self, task_type: TaskType, tags: &BTreeSet<String>) -> bool {
        self.enabled && self.supports_type(task_type) && self.supports_tech(tags)
    }
}

/// Immutable mapping from agent identifier to declared capabilities.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentDescriptor>,
}

impl AgentRegistry {
    /// Build a registry. A later descriptor with a repeated id replaces the earlier one.
    pub fn new<I>(agents: I) -> Self
    where
        I: IntoIterator<Item = AgentDescriptor>,
    {
        Self {
            agents: agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    /// Identifiers of every agent eligible for a task of `task_type` with `tags`,
    /// in lexicographic order.
    pub fn lookup(&self, task_type: TaskType, tags: &BTreeSet<String>) -> BTreeSet<String> {
        self.agents
            .values()
            .filter(|a| a.is_eligible(task_type, tags))
            .map(|a| a.id.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&AgentDescriptor> {
        self.agents.get(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterate over all agents in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.values()
    }
}

//! Agent roster configuration (`agents.yaml`).
//!
//! # File Format
//!
//! ```yaml
//! agents:
//!   backend:
//!     name: "Backend Engineer"
//!     task_types: [implement_feature, fix_bug, refactor]
//!     technologies: [rust, postgres]
//!     command: "claude -p {task_file}"
//!     timeout_seconds: 900
//!     environment:
//!       RUST_BACKTRACE: "1"
//!
//!   generalist:
//!     task_types: [any]
//!     enabled: false
//!
//! defaults:
//!   timeout_seconds: 600
//! ```
//!
//! An empty `technologies` list means the agent accepts any technology. The
//! `any` task type matches every task type.

use super::registry::{AgentDescriptor, AgentRegistry};
use crate::error::{Result, SprintError};
use crate::task::TaskType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

/// Default timeout for agent execution in seconds.
const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Configuration for all agents, loaded from `agents.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Agent profiles keyed by identifier.
    pub agents: BTreeMap<String, AgentProfile>,

    /// Default settings applied to all agents.
    pub defaults: AgentDefaults,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Default settings for agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    /// Default timeout in seconds.
    pub timeout_seconds: u64,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            extra: BTreeMap::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Profile for a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Human-readable name for the agent.
    #[serde(default)]
    pub name: String,

    /// Task types this agent accepts; `any` accepts all.
    #[serde(default)]
    pub task_types: BTreeSet<TaskType>,

    /// Technology tags this agent works with; empty accepts all.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub technologies: BTreeSet<String>,

    /// Disabled agents are never selected.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Command template run by the command executor.
    ///
    /// Placeholders: `{task_id}`, `{task_type}`, `{agent_id}`, `{task_file}`,
    /// `{description}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Timeout in seconds (overrides default if set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,

    /// Environment variables to set for the agent process.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub environment: HashMap<String, String>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            task_types: BTreeSet::new(),
            technologies: BTreeSet::new(),
            enabled: true,
            command: None,
            timeout_seconds: None,
            environment: HashMap::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl AgentProfile {
    /// Get the effective timeout for this agent.
    pub fn effective_timeout(&self, defaults: &AgentDefaults) -> u64 {
        self.timeout_seconds.unwrap_or(defaults.timeout_seconds)
    }
}

impl AgentsConfig {
    /// Load agents config from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SprintError::UserError(format!(
                "failed to read agents config '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map(Some)
    }

    /// Parse agents config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AgentsConfig = serde_yaml::from_str(yaml)
            .map_err(|e| SprintError::UserError(format!("failed to parse agents.yaml: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SprintError::UserError(format!("failed to serialize agents config: {}", e))
        })
    }

    /// Validate the agents configuration.
    ///
    /// - Agent identifiers must not be empty or contain whitespace
    /// - Every agent must declare at least one task type
    /// - Timeouts must be positive
    /// - Commands, when present, must not be blank
    pub fn validate(&self) -> Result<()> {
        if self.defaults.timeout_seconds == 0 {
            return Err(SprintError::UserError(
                "agents.yaml validation failed: defaults.timeout_seconds must be greater than 0"
                    .to_string(),
            ));
        }

        for (id, agent) in &self.agents {
            if id.trim().is_empty() || id.chars().any(char::is_whitespace) {
                return Err(SprintError::UserError(format!(
                    "agents.yaml validation failed: invalid agent identifier '{}'",
                    id
                )));
            }

            if agent.task_types.is_empty() {
                return Err(SprintError::UserError(format!(
                    "agents.yaml validation failed: agent '{}' declares no task_types \
                     (use [any] to accept every type)",
                    id
                )));
            }

            if agent.timeout_seconds == Some(0) {
                return Err(SprintError::UserError(format!(
                    "agents.yaml validation failed: agent '{}' has timeout_seconds of 0",
                    id
                )));
            }

            if let Some(command) = &agent.command
                && command.trim().is_empty()
            {
                return Err(SprintError::UserError(format!(
                    "agents.yaml validation failed: agent '{}' has empty command",
                    id
                )));
            }
        }

        Ok(())
    }

    /// Get an agent by identifier.
    pub fn get(&self, id: &str) -> Option<&AgentProfile> {
        self.agents.get(id)
    }

    /// Build the immutable capability registry for a scheduling session.
    pub fn registry(&self) -> AgentRegistry {
        AgentRegistry::new(self.agents.iter().map(|(id, profile)| AgentDescriptor {
            id: id.clone(),
            task_types: profile.task_types.clone(),
            technologies: profile.technologies.clone(),
            enabled: profile.enabled,
        }))
    }
}

/// Sample roster written by `sprintctl init`.
pub fn default_agents_yaml() -> &'static str {
    r#"# Agent roster for sprintctl.
#
# task_types: task types the agent accepts ([any] accepts all)
# technologies: technology tags the agent works with (empty accepts all)
# command: run by `sprintctl sprint run`; placeholders:
#   {task_id} {task_type} {agent_id} {task_file} {description}

agents:
  architect:
    name: "Solution Architect"
    task_types: [design_architecture, analyze_codebase, estimate_story]
    command: "echo architect {task_id}"

  backend:
    name: "Backend Engineer"
    task_types: [implement_feature, fix_bug, refactor]
    technologies: [rust, go, python, postgres]
    command: "echo backend {task_id}"

  frontend:
    name: "Frontend Engineer"
    task_types: [implement_feature, fix_bug, refactor]
    technologies: [typescript, react, css]
    command: "echo frontend {task_id}"

  qa:
    name: "QA Engineer"
    task_types: [write_tests, review_code]
    command: "echo qa {task_id}"

  devops:
    name: "DevOps Engineer"
    task_types: [deploy]
    technologies: [docker, kubernetes, terraform]
    command: "echo devops {task_id}"

  writer:
    name: "Technical Writer"
    task_types: [write_docs]
    command: "echo writer {task_id}"

defaults:
  timeout_seconds: 600
"#
}

//! Event logging subsystem for sprintctl.
//!
//! Delegation decisions, task outcomes, and roadmap mutations are appended
//! to an NDJSON log (one JSON object per line), by default
//! `.sprintctl/events/events.ndjson`.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (`sprint_start`, `agent_dispatch`, ...)
//! - `actor`: `user@HOST`
//! - `task`: task identifier for task-scoped events
//! - `details`: action-specific object
//!
//! # Usage
//!
//! ```no_run
//! use sprintctl::events::{Event, EventAction, EventLog};
//! use serde_json::json;
//!
//! let log = EventLog::new(".sprintctl/events/events.ndjson");
//! log.append(&Event::new(EventAction::SprintStart).with_details(json!({"tasks": 3})))?;
//! # Ok::<(), sprintctl::error::SprintError>(())
//! ```

use crate::error::{Result, SprintError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Workspace scaffolding created
    Init,
    /// A validated batch is about to execute
    SprintStart,
    /// A task was handed to its resolved agent
    AgentDispatch,
    /// The executor returned a result (or faulted)
    AgentComplete,
    /// No single agent could be chosen for a task
    DelegationFailed,
    /// A task was skipped because a predecessor failed
    TaskBlocked,
    /// Every task in the batch has a result
    SprintComplete,
    RoadmapCreate,
    MilestoneAdd,
    MilestoneUpdate,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventAction::Init => "init",
            EventAction::SprintStart => "sprint_start",
            EventAction::AgentDispatch => "agent_dispatch",
            EventAction::AgentComplete => "agent_complete",
            EventAction::DelegationFailed => "delegation_failed",
            EventAction::TaskBlocked => "task_blocked",
            EventAction::SprintComplete => "sprint_complete",
            EventAction::RoadmapCreate => "roadmap_create",
            EventAction::MilestoneAdd => "milestone_add",
            EventAction::MilestoneUpdate => "milestone_update",
        };
        f.write_str(name)
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Task identifier for task-scoped events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            task: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task = Some(task_id.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            SprintError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// `USER@HOSTNAME`, falling back to `unknown` for either part.
fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only NDJSON event log.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single line, creating the file and its
    /// directory if needed.
    ///
    /// A failed append is an error: callers must not report an operation as
    /// done when its audit record is missing.
    pub fn append(&self, event: &Event) -> Result<()> {
        let json_line = event.to_ndjson_line()?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                SprintError::UserError(format!(
                    "failed to create events directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                SprintError::UserError(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", json_line).map_err(|e| {
            SprintError::UserError(format!(
                "failed to write event to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        file.sync_all().map_err(|e| {
            SprintError::UserError(format!(
                "failed to sync events file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Read every event back, in append order.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            SprintError::UserError(format!(
                "failed to read events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| {
                    SprintError::UserError(format!(
                        "malformed event on line {} of '{}': {}",
                        n + 1,
                        self.path.display(),
                        e
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::SprintStart);

        assert_eq!(event.action, EventAction::SprintStart);
        assert!(event.actor.contains('@'));
        assert!(event.task.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(EventAction::AgentDispatch)
            .with_task("API-1")
            .with_details(json!({"agent": "backend", "decided_by": "technology fit"}));

        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"agent_dispatch\""));

        let parsed: Event = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.task.as_deref(), Some("API-1"));
        assert_eq!(parsed.details["agent"], "backend");
    }

    #[test]
    fn test_event_without_task_omits_field() {
        let line = Event::new(EventAction::Init).to_ndjson_line().unwrap();
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert!(parsed.get("task").is_none());
    }

    #[test]
    fn test_append_creates_file_and_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("events").join("events.ndjson"));
        assert!(!log.path().exists());

        log.append(&Event::new(EventAction::Init)).unwrap();

        assert!(log.path().exists());
        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.ends_with('\n'));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_append_multiple_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("events.ndjson"));

        log.append(&Event::new(EventAction::RoadmapCreate)).unwrap();
        log.append(&Event::new(EventAction::MilestoneAdd).with_details(json!({"roadmap": "RM-1"})))
            .unwrap();

        let events = log.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::RoadmapCreate);
        assert_eq!(events[1].details["roadmap"], "RM-1");
    }

    #[test]
    fn test_read_all_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = EventLog::new(temp_dir.path().join("none.ndjson"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_event_action_display_matches_serde() {
        let actions = [
            EventAction::Init,
            EventAction::SprintStart,
            EventAction::AgentDispatch,
            EventAction::AgentComplete,
            EventAction::DelegationFailed,
            EventAction::TaskBlocked,
            EventAction::SprintComplete,
            EventAction::RoadmapCreate,
            EventAction::MilestoneAdd,
            EventAction::MilestoneUpdate,
        ];
        for action in actions {
            let encoded = serde_json::to_string(&action).unwrap();
            assert_eq!(encoded, format!("\"{}\"", action));
        }
    }
}

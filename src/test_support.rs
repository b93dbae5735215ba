use crate::agent::{AgentDescriptor, AgentRegistry, TaskExecutor};
use crate::error::{Result, SprintError};
use crate::task::{Task, TaskResult, TaskType};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Executor that records every call and answers from fixed rules.
///
/// Tasks in `failing` get an unsuccessful result, tasks in `faulting` return
/// an `Err`, and everything else succeeds.
#[derive(Default)]
pub(crate) struct RecordingExecutor {
    calls: Mutex<Vec<(String, String)>>,
    failing: HashSet<String>,
    faulting: HashSet<String>,
    delay: Option<Duration>,
}

impl RecordingExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, task_id: &str) -> Self {
        self.failing.insert(task_id.to_string());
        self
    }

    pub(crate) fn faulting(mut self, task_id: &str) -> Self {
        self.faulting.insert(task_id.to_string());
        self
    }

    /// Sleep this long inside every call.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(task_id, agent_id)` pairs in call order.
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    pub(crate) fn called_tasks(&self) -> Vec<String> {
        self.calls().into_iter().map(|(task, _)| task).collect()
    }
}

impl TaskExecutor for RecordingExecutor {
    fn execute(&self, task: &Task, agent_id: &str) -> Result<TaskResult> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push((task.id.clone(), agent_id.to_string()));

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        if self.faulting.contains(&task.id) {
            return Err(SprintError::ExecutorFault("agent process vanished".to_string()));
        }
        if self.failing.contains(&task.id) {
            return Ok(TaskResult::failed(
                &task.id,
                Some(agent_id.to_string()),
                "tests did not pass",
            ));
        }
        Ok(TaskResult::succeeded(&task.id, agent_id, "done"))
    }
}

/// A registry with one catch-all agent, `generalist`.
pub(crate) fn generalist_registry() -> AgentRegistry {
    AgentRegistry::new([AgentDescriptor::new(
        "generalist",
        [TaskType::Any],
        Vec::<String>::new(),
    )])
}

/// A registry modelled on a small team.
pub(crate) fn team_registry() -> AgentRegistry {
    AgentRegistry::new([
        AgentDescriptor::new(
            "backend",
            [TaskType::ImplementFeature, TaskType::FixBug, TaskType::WriteTests],
            ["python", "rust", "postgres"],
        ),
        AgentDescriptor::new(
            "frontend",
            [TaskType::ImplementFeature, TaskType::FixBug],
            ["react", "typescript"],
        ),
        AgentDescriptor::new(
            "qa",
            [TaskType::WriteTests, TaskType::ReviewCode],
            Vec::<String>::new(),
        ),
        AgentDescriptor::new("devops", [TaskType::Deploy], ["docker", "kubernetes"]),
    ])
}

pub(crate) fn task(id: &str, task_type: TaskType, deps: &[&str]) -> Task {
    Task::new(id, task_type).depending_on(deps.iter().copied())
}

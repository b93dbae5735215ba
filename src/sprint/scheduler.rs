//! Sprint execution with failure isolation.

use super::graph::execution_order;
use crate::agent::{DecidedBy, Resolver, TaskExecutor};
use crate::error::{Result, SprintError};
use crate::events::{Event, EventAction, EventLog};
use crate::task::{Task, TaskResult};
use serde_json::json;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// Drives a batch of tasks through delegation and execution.
///
/// Tasks run in dependency order. Tasks whose predecessors have all settled
/// may run concurrently, up to `max_parallel` at once; with the default of 1
/// execution follows the planned order exactly.
pub struct Scheduler<'a> {
    resolver: Resolver<'a>,
    executor: &'a dyn TaskExecutor,
    max_parallel: usize,
    events: Option<&'a EventLog>,
}

/// One row of a dry-run plan.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub task_id: String,
    pub depends_on: Vec<String>,
    /// The agent the task would be delegated to, or the delegation error.
    pub delegation: std::result::Result<(String, DecidedBy), String>,
}

/// Outcome of a sprint: one result per submitted task.
#[derive(Debug, Clone, Default)]
pub struct SprintReport {
    /// Planned execution order (task identifiers).
    pub order: Vec<String>,
    /// Results in the order they were produced.
    pub results: Vec<TaskResult>,
}

impl SprintReport {
    pub fn get(&self, task_id: &str) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Tasks that ran (or failed delegation) and did not succeed.
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| !r.success && !r.is_blocked())
            .count()
    }

    pub fn blocked(&self) -> usize {
        self.results.iter().filter(|r| r.is_blocked()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

impl<'a> Scheduler<'a> {
    pub fn new(resolver: Resolver<'a>, executor: &'a dyn TaskExecutor) -> Self {
        Self {
            resolver,
            executor,
            max_parallel: 1,
            events: None,
        }
    }

    /// Maximum number of tasks executing at the same time (at least 1).
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Record dispatch, completion, and blocking events to `log`.
    pub fn with_event_log(mut self, log: &'a EventLog) -> Self {
        self.events = Some(log);
        self
    }

    /// Validate the batch and report the planned order and delegations
    /// without executing anything.
    pub fn plan(&self, tasks: &[Task]) -> Result<Vec<PlanEntry>> {
        let order = execution_order(tasks)?;
        Ok(order
            .into_iter()
            .map(|i| {
                let task = &tasks[i];
                PlanEntry {
                    task_id: task.id.clone(),
                    depends_on: task.depends_on.clone(),
                    delegation: self
                        .resolver
                        .resolve(task)
                        .map(|d| (d.agent_id.to_string(), d.decided_by))
                        .map_err(|e| e.to_string()),
                }
            })
            .collect())
    }

    /// Run the batch and return one result per task.
    ///
    /// # Errors
    ///
    /// Structural problems (duplicate id, unknown dependency, cycle) are
    /// returned before any agent is invoked. Per-task failures never produce
    /// an `Err`; they are recorded in the report and block dependents. An
    /// `Err` after execution has started only comes from the event log.
    pub fn run(&self, tasks: &[Task]) -> Result<SprintReport> {
        let order = execution_order(tasks)?;

        self.log(Event::new(EventAction::SprintStart).with_details(json!({
            "tasks": tasks.len(),
            "max_parallel": self.max_parallel,
            "order": order.iter().map(|&i| tasks[i].id.as_str()).collect::<Vec<_>>(),
        })))?;

        // Settled tasks: id -> None on success, or the id of the task whose
        // failure caused this one to fail.
        let mut settled: HashMap<&str, Option<&str>> = HashMap::with_capacity(tasks.len());
        let mut results = Vec::with_capacity(tasks.len());
        let mut pending = order.clone();

        while !pending.is_empty() {
            let mut batch: Vec<(&Task, String)> = Vec::new();
            let mut deferred = Vec::new();

            for &i in &pending {
                let task = &tasks[i];
                let ready = task
                    .depends_on
                    .iter()
                    .all(|d| settled.contains_key(d.as_str()));
                if batch.len() >= self.max_parallel || !ready {
                    deferred.push(i);
                    continue;
                }

                if let Some(root) = task
                    .depends_on
                    .iter()
                    .find_map(|d| settled.get(d.as_str()).copied().flatten())
                {
                    self.log(
                        Event::new(EventAction::TaskBlocked)
                            .with_task(&task.id)
                            .with_details(json!({ "failed_dependency": root })),
                    )?;
                    settled.insert(&task.id, Some(root));
                    results.push(TaskResult::blocked(&task.id, root));
                    continue;
                }

                match self.resolver.resolve(task) {
                    Ok(delegation) => {
                        self.log(
                            Event::new(EventAction::AgentDispatch)
                                .with_task(&task.id)
                                .with_details(json!({
                                    "agent": delegation.agent_id,
                                    "decided_by": delegation.decided_by.to_string(),
                                })),
                        )?;
                        batch.push((task, delegation.agent_id.to_string()));
                    }
                    Err(e) => {
                        self.log(
                            Event::new(EventAction::DelegationFailed)
                                .with_task(&task.id)
                                .with_details(json!({ "error": e.to_string() })),
                        )?;
                        settled.insert(&task.id, Some(task.id.as_str()));
                        results.push(TaskResult::failed(&task.id, None, e.to_string()));
                    }
                }
            }

            let outcomes = self.execute_batch(&batch);
            for (&(task, _), result) in batch.iter().zip(outcomes) {
                self.log(
                    Event::new(EventAction::AgentComplete)
                        .with_task(&task.id)
                        .with_details(json!({
                            "agent": result.agent_id,
                            "success": result.success,
                            "message": result.message,
                        })),
                )?;
                settled.insert(&task.id, (!result.success).then_some(task.id.as_str()));
                results.push(result);
            }

            pending = deferred;
        }

        let report = SprintReport {
            order: order.iter().map(|&i| tasks[i].id.clone()).collect(),
            results,
        };

        self.log(Event::new(EventAction::SprintComplete).with_details(json!({
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "blocked": report.blocked(),
        })))?;

        Ok(report)
    }

    /// Execute delegated tasks, concurrently when there is more than one.
    ///
    /// Results come back in batch order.
    fn execute_batch(&self, batch: &[(&Task, String)]) -> Vec<TaskResult> {
        let executor = self.executor;
        match batch {
            [] => Vec::new(),
            [(task, agent)] => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    execute_one(executor, task, agent)
                }));
                vec![outcome.unwrap_or_else(|_| panicked(task, agent))]
            }
            _ => std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|(task, agent)| scope.spawn(move || execute_one(executor, task, agent)))
                    .collect();

                handles
                    .into_iter()
                    .zip(batch)
                    .map(|(handle, (task, agent))| {
                        handle.join().unwrap_or_else(|_| panicked(task, agent))
                    })
                    .collect()
            }),
        }
    }

    fn log(&self, event: Event) -> Result<()> {
        match self.events {
            Some(log) => log.append(&event),
            None => Ok(()),
        }
    }
}

fn panicked(task: &Task, agent: &str) -> TaskResult {
    TaskResult::failed(
        &task.id,
        Some(agent.to_string()),
        "executor fault: agent execution panicked",
    )
}

/// Run one task and normalize the executor's answer into a result for it.
fn execute_one(executor: &dyn TaskExecutor, task: &Task, agent: &str) -> TaskResult {
    match executor.execute(task, agent) {
        Ok(mut result) => {
            // Results must correlate with the submitted task regardless of
            // what the executor filled in.
            result.task_id = task.id.clone();
            if result.agent_id.is_none() {
                result.agent_id = Some(agent.to_string());
            }
            result
        }
        Err(e @ SprintError::ExecutorFault(_)) => {
            TaskResult::failed(&task.id, Some(agent.to_string()), e.to_string())
        }
        Err(e) => TaskResult::failed(
            &task.id,
            Some(agent.to_string()),
            format!("executor fault: {}", e),
        ),
    }
}

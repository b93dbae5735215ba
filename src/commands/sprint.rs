//! Implementation of the `sprintctl sprint` commands.
//!
//! - `sprint plan` - Validate a sprint file and preview order and delegation
//! - `sprint run` - Execute a sprint through the configured agent commands

use super::Workspace;
use crate::agent::{CommandExecutor, Resolver};
use crate::cli::{SprintPlanArgs, SprintRunArgs};
use crate::error::{Result, SprintError};
use crate::sprint::{PlanEntry, Scheduler, SprintReport};
use crate::task::{SprintFile, Task};
use serde_json::json;
use std::path::Path;

pub fn cmd_sprint_plan(args: SprintPlanArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let tasks = load_tasks(&args.file)?;

    let plan = plan_sprint(&ws, &tasks)?;

    println!("Sprint plan ({} task(s)):", plan.len());
    println!();
    for line in format_plan(&plan) {
        println!("{}", line);
    }

    let unassigned = plan.iter().filter(|e| e.delegation.is_err()).count();
    if unassigned > 0 {
        println!();
        println!(
            "Note: {} task(s) have no agent and would fail, blocking their dependents.",
            unassigned
        );
    }

    Ok(())
}

pub fn cmd_sprint_run(args: SprintRunArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let tasks = load_tasks(&args.file)?;

    let report = run_sprint(&ws, &tasks, args.max_parallel)?;

    if args.json {
        let output = report_json(&report);
        let rendered = serde_json::to_string_pretty(&output).map_err(|e| {
            SprintError::UserError(format!("failed to serialize sprint report: {}", e))
        })?;
        println!("{}", rendered);
    } else {
        for line in format_report(&report) {
            println!("{}", line);
        }
    }

    if report.all_succeeded() {
        Ok(())
    } else {
        Err(SprintError::TasksFailed {
            failed: report.failed() + report.blocked(),
            total: report.results.len(),
        })
    }
}

fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    SprintFile::load(path)?.into_tasks()
}

pub(super) fn plan_sprint(ws: &Workspace, tasks: &[Task]) -> Result<Vec<PlanEntry>> {
    let agents = ws.agents()?;
    let registry = agents.registry();
    let resolver =
        Resolver::new(&registry).with_lexicographic_tie_break(ws.config.lexicographic_tie_break);
    let executor = CommandExecutor::new(agents.clone(), &ws.ctx.logs_dir, &ws.ctx.root);

    Scheduler::new(resolver, &executor).plan(tasks)
}

pub(super) fn run_sprint(
    ws: &Workspace,
    tasks: &[Task],
    max_parallel: Option<u32>,
) -> Result<SprintReport> {
    let agents = ws.agents()?;
    let registry = agents.registry();
    let resolver =
        Resolver::new(&registry).with_lexicographic_tie_break(ws.config.lexicographic_tie_break);
    let executor = CommandExecutor::new(agents.clone(), &ws.ctx.logs_dir, &ws.ctx.root);
    let max_parallel = max_parallel.unwrap_or(ws.config.max_parallel);

    Scheduler::new(resolver, &executor)
        .with_max_parallel(max_parallel as usize)
        .with_event_log(&ws.events)
        .run(tasks)
}

fn format_plan(plan: &[PlanEntry]) -> Vec<String> {
    plan.iter()
        .enumerate()
        .map(|(i, entry)| {
            let agent = match &entry.delegation {
                Ok((agent, decided_by)) => format!("{} ({})", agent, decided_by),
                Err(e) => format!("NONE: {}", e),
            };
            let deps = if entry.depends_on.is_empty() {
                String::new()
            } else {
                format!("  after {}", entry.depends_on.join(", "))
            };
            format!("  {:>3}. {:<16} -> {}{}", i + 1, entry.task_id, agent, deps)
        })
        .collect()
}

fn format_report(report: &SprintReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.results.len() + 3);
    for id in &report.order {
        let Some(result) = report.get(id) else {
            continue;
        };
        let status = if result.success {
            "OK"
        } else if result.is_blocked() {
            "BLOCKED"
        } else {
            "FAILED"
        };
        lines.push(format!(
            "  {:<8} {:<16} {:<12} {}",
            status,
            result.task_id,
            result.agent_id.as_deref().unwrap_or("-"),
            result.message
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "{} succeeded, {} failed, {} blocked",
        report.succeeded(),
        report.failed(),
        report.blocked()
    ));
    lines
}

fn report_json(report: &SprintReport) -> serde_json::Value {
    json!({
        "order": report.order,
        "results": report.results,
        "summary": {
            "succeeded": report.succeeded(),
            "failed": report.failed(),
            "blocked": report.blocked(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init::init_workspace;
    use crate::context::WorkspaceContext;
    use crate::events::EventAction;
    use tempfile::TempDir;

    const ROSTER: &str = r#"
agents:
  backend:
    task_types: [implement_feature, fix_bug]
    technologies: [rust]
    command: "echo backend {task_id}"
  broken:
    task_types: [write_tests]
    command: "sh -c \"exit 1\""
  ops:
    task_types: [deploy]
    command: "echo ops {task_id}"
"#;

    fn workspace(temp_dir: &TempDir) -> Workspace {
        let ctx = WorkspaceContext::at(temp_dir.path());
        init_workspace(&ctx).unwrap();
        std::fs::write(ctx.state_dir.join("agents.yaml"), ROSTER).unwrap();
        Workspace::open(ctx).unwrap()
    }

    fn tasks(yaml: &str) -> Vec<Task> {
        SprintFile::from_yaml(yaml).unwrap().into_tasks().unwrap()
    }

    #[test]
    fn plan_lists_delegations_without_running() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);
        let tasks = tasks(
            r#"
tasks:
  - id: ship
    type: deploy
    depends_on: [api]
  - id: api
    type: implement_feature
    tech_constraints: [rust]
  - id: docs
    type: write_docs
"#,
        );

        let plan = plan_sprint(&ws, &tasks).unwrap();

        let lines = format_plan(&plan);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("api") && lines[0].contains("backend"));
        assert!(lines[1].contains("after api"));
        assert!(lines[2].contains("NONE: no eligible agent"));
        assert!(!ws.ctx.logs_dir.join("api").exists());
    }

    #[cfg(not(windows))]
    #[test]
    fn run_executes_commands_and_blocks_dependents() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);
        let tasks = tasks(
            r#"
tasks:
  - id: api
    type: implement_feature
    tech_constraints: [rust]
  - id: tests
    type: write_tests
    depends_on: [api]
  - id: ship
    type: deploy
    depends_on: [tests]
"#,
        );

        let report = run_sprint(&ws, &tasks, None).unwrap();

        assert!(report.get("api").unwrap().success);
        let tests = report.get("tests").unwrap();
        assert_eq!(tests.message, "agent exited with code 1");
        assert_eq!(
            report.get("ship").unwrap().message,
            "blocked by failed dependency: tests"
        );

        let stdout =
            std::fs::read_to_string(ws.ctx.logs_dir.join("api").join("stdout.log")).unwrap();
        assert_eq!(stdout.trim(), "backend api");

        let lines = format_report(&report);
        assert_eq!(lines.last().unwrap(), "1 succeeded, 1 failed, 1 blocked");

        let actions: Vec<EventAction> = ws
            .events
            .read_all()
            .unwrap()
            .into_iter()
            .map(|e| e.action)
            .collect();
        assert!(actions.contains(&EventAction::SprintStart));
        assert!(actions.contains(&EventAction::TaskBlocked));
        assert_eq!(actions.last(), Some(&EventAction::SprintComplete));
    }

    #[test]
    fn run_rejects_cycle_before_execution() {
        let temp_dir = TempDir::new().unwrap();
        let ws = workspace(&temp_dir);
        let tasks = tasks(
            r#"
tasks:
  - id: a
    type: fix_bug
    depends_on: [b]
  - id: b
    type: fix_bug
    depends_on: [a]
"#,
        );

        let err = run_sprint(&ws, &tasks, Some(2)).unwrap_err();

        assert!(matches!(err, SprintError::CyclicDependency { .. }));
        assert!(!ws.ctx.logs_dir.join("a").exists());
    }

    #[test]
    fn report_json_shape() {
        let report = SprintReport {
            order: vec!["a".to_string()],
            results: vec![crate::task::TaskResult::succeeded("a", "backend", "done")],
        };

        let value = report_json(&report);

        assert_eq!(value["order"][0], "a");
        assert_eq!(value["results"][0]["agent_id"], "backend");
        assert_eq!(value["summary"]["succeeded"], 1);
        assert_eq!(value["summary"]["blocked"], 0);
    }
}

//! Implementation of the `sprintctl agents` commands.
//!
//! - `agents list` - Show the roster with declared capabilities
//! - `agents match` - Dry-run delegation for a task type and tag set

use super::Workspace;
use crate::agent::{AgentsConfig, Delegation, Resolver};
use crate::cli::AgentsMatchArgs;
use crate::error::{Result, SprintError};
use crate::task::{Task, TaskType};
use std::collections::BTreeSet;

pub fn cmd_agents_list() -> Result<()> {
    let ws = Workspace::resolve()?;
    let agents = ws.agents()?;

    if agents.agents.is_empty() {
        println!("No agents configured.");
        return Ok(());
    }

    println!("Agents ({}):", agents.agents.len());
    println!();
    for line in describe_agents(&agents) {
        println!("{}", line);
    }

    Ok(())
}

pub fn cmd_agents_match(args: AgentsMatchArgs) -> Result<()> {
    let ws = Workspace::resolve()?;
    let agents = ws.agents()?;
    let registry = agents.registry();
    let resolver =
        Resolver::new(&registry).with_lexicographic_tie_break(ws.config.lexicographic_tie_break);

    let task = query_task(&args)?;
    let eligible = registry.lookup(task.task_type, &task.tech_constraints);

    println!("Task type:    {}", task.task_type);
    println!("Technologies: {}", task.tech_display());
    println!(
        "Eligible:     {}",
        if eligible.is_empty() {
            "(none)".to_string()
        } else {
            eligible.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    );

    let Delegation {
        agent_id,
        decided_by,
    } = resolver.resolve(&task)?;
    println!("Delegated to: {} ({})", agent_id, decided_by);

    Ok(())
}

/// Build the hypothetical task that `agents match` resolves.
fn query_task(args: &AgentsMatchArgs) -> Result<Task> {
    let task_type = TaskType::parse(&args.task_type)
        .filter(|t| *t != TaskType::Any)
        .ok_or_else(|| {
            SprintError::UserError(format!(
                "unknown task type '{}'\nValid types: {}",
                args.task_type,
                TaskType::CONCRETE
                    .iter()
                    .map(TaskType::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;

    let tags: BTreeSet<String> = args
        .tech
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Task::new("(query)", task_type).with_tech(tags))
}

fn describe_agents(agents: &AgentsConfig) -> Vec<String> {
    let mut lines = Vec::new();
    for (id, profile) in &agents.agents {
        let status = if profile.enabled { "" } else { " (disabled)" };
        lines.push(format!("  {}{}:", id, status));
        if !profile.name.is_empty() {
            lines.push(format!("    Name:         {}", profile.name));
        }
        lines.push(format!(
            "    Task types:   {}",
            profile
                .task_types
                .iter()
                .map(TaskType::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));
        lines.push(format!(
            "    Technologies: {}",
            if profile.technologies.is_empty() {
                "(any)".to_string()
            } else {
                profile
                    .technologies
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        ));
        lines.push(format!(
            "    Command:      {}",
            profile.command.as_deref().unwrap_or("(none)")
        ));
        lines.push(format!(
            "    Timeout:      {}s",
            profile.effective_timeout(&agents.defaults)
        ));
        lines.push(String::new());
    }
    lines
}

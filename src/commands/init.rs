//! Implementation of the `sprintctl init` command.
//!
//! # What `sprintctl init` does
//!
//! 1. Creates `.sprintctl/` with `events/` and `logs/`
//! 2. Writes `config.yaml` with defaults (if missing)
//! 3. Writes a sample `agents.yaml` roster (if missing)
//! 4. Writes `.gitignore` ignoring `logs/` (if missing)
//! 5. Appends an `init` event
//!
//! Running it again never overwrites existing files.

use crate::agent::default_agents_yaml;
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{Result, SprintError};
use crate::events::{Event, EventAction, EventLog};
use crate::fs::atomic_write_file;
use serde_json::json;
use std::fs;
use std::path::Path;

/// Execute the `sprintctl init` command in the current directory.
pub fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir().map_err(|e| {
        SprintError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    let ctx = WorkspaceContext::at(cwd);

    let created = init_workspace(&ctx)?;

    if created.is_empty() {
        println!("Workspace already initialized at {}", ctx.state_dir.display());
        return Ok(());
    }

    println!("Initialized sprintctl workspace.");
    println!();
    println!("Created:");
    for path in &created {
        println!("  {}", path);
    }
    println!();
    println!("Edit .sprintctl/agents.yaml to describe your agents, then run");
    println!("`sprintctl sprint plan <file>` to preview a sprint.");

    Ok(())
}

/// Scaffold the workspace and return the paths (relative to the root) that
/// did not exist before.
pub(super) fn init_workspace(ctx: &WorkspaceContext) -> Result<Vec<String>> {
    let mut created = Vec::new();

    for dir in [&ctx.state_dir, &ctx.events_dir, &ctx.logs_dir] {
        if !dir.is_dir() {
            create_dir(dir)?;
            created.push(relative(ctx, dir));
        }
    }

    let config = Config::default();
    let files = [
        (ctx.config_path(), config.to_yaml()?),
        (
            config.agents_path(&ctx.state_dir),
            default_agents_yaml().to_string(),
        ),
        (
            ctx.state_dir.join(".gitignore"),
            "# Machine-local files (never commit)\nlogs/\n".to_string(),
        ),
    ];
    for (path, content) in &files {
        if !path.exists() {
            atomic_write_file(path, content)?;
            created.push(relative(ctx, path));
        }
    }

    EventLog::new(ctx.events_path()).append(&Event::new(EventAction::Init).with_details(json!({
        "root": ctx.root.display().to_string(),
        "created": created,
    })))?;

    Ok(created)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| {
        SprintError::UserError(format!(
            "failed to create directory '{}': {}",
            path.display(),
            e
        ))
    })
}

fn relative(ctx: &WorkspaceContext, path: &Path) -> String {
    path.strip_prefix(&ctx.root)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentsConfig;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = WorkspaceContext::at(temp_dir.path());

        let created = init_workspace(&ctx).unwrap();

        assert!(ctx.state_dir.is_dir());
        assert!(ctx.events_dir.is_dir());
        assert!(ctx.logs_dir.is_dir());
        assert!(ctx.config_path().exists());
        assert!(ctx.state_dir.join("agents.yaml").exists());
        assert!(created.iter().any(|p| p.ends_with("config.yaml")));

        // The written files load cleanly.
        assert_eq!(ctx.load_config().unwrap(), Config::default());
        let agents = AgentsConfig::load(ctx.state_dir.join("agents.yaml"))
            .unwrap()
            .unwrap();
        assert!(!agents.agents.is_empty());
    }

    #[test]
    fn init_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = WorkspaceContext::at(temp_dir.path());
        init_workspace(&ctx).unwrap();

        std::fs::write(ctx.config_path(), "max_parallel: 5\n").unwrap();
        let created = init_workspace(&ctx).unwrap();

        assert!(created.is_empty());
        assert_eq!(ctx.load_config().unwrap().max_parallel, 5);
    }

    #[test]
    fn init_logs_event_each_time() {
        let temp_dir = TempDir::new().unwrap();
        let ctx = WorkspaceContext::at(temp_dir.path());

        init_workspace(&ctx).unwrap();
        init_workspace(&ctx).unwrap();

        let events = EventLog::new(ctx.events_path()).read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.action == EventAction::Init));
        assert!(events[1].details["created"].as_array().unwrap().is_empty());
    }

    #[test]
    fn initialized_workspace_resolves() {
        let temp_dir = TempDir::new().unwrap();
        init_workspace(&WorkspaceContext::at(temp_dir.path())).unwrap();

        let nested = temp_dir.path().join("deep");
        std::fs::create_dir(&nested).unwrap();
        let ctx = WorkspaceContext::resolve_from(&nested).unwrap();
        assert_eq!(ctx.root, temp_dir.path());
    }
}

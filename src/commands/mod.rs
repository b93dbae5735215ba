//! Command implementations for sprintctl.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the workspace loading shared between them.

mod agents;
mod init;
mod roadmap;
mod sprint;

use crate::agent::AgentsConfig;
use crate::cli::{AgentsAction, Command, RoadmapAction, SprintAction};
use crate::config::Config;
use crate::context::WorkspaceContext;
use crate::error::{Result, SprintError};
use crate::events::EventLog;

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Agents(cmd) => match cmd.action {
            AgentsAction::List => agents::cmd_agents_list(),
            AgentsAction::Match(args) => agents::cmd_agents_match(args),
        },
        Command::Sprint(cmd) => match cmd.action {
            SprintAction::Plan(args) => sprint::cmd_sprint_plan(args),
            SprintAction::Run(args) => sprint::cmd_sprint_run(args),
        },
        Command::Roadmap(cmd) => match cmd.action {
            RoadmapAction::Create(args) => roadmap::cmd_roadmap_create(args),
            RoadmapAction::Milestone(args) => roadmap::cmd_roadmap_milestone(args),
            RoadmapAction::UpdateMilestone(args) => roadmap::cmd_roadmap_update_milestone(args),
            RoadmapAction::List => roadmap::cmd_roadmap_list(),
            RoadmapAction::Show(args) => roadmap::cmd_roadmap_show(args),
        },
    }
}

/// Everything a command needs from an initialized workspace.
struct Workspace {
    ctx: WorkspaceContext,
    config: Config,
    events: EventLog,
}

impl Workspace {
    /// Resolve the enclosing workspace from the current directory.
    fn resolve() -> Result<Self> {
        Self::open(WorkspaceContext::resolve()?)
    }

    fn open(ctx: WorkspaceContext) -> Result<Self> {
        let config = ctx.load_config()?;
        let events = EventLog::new(ctx.events_path());
        Ok(Self {
            ctx,
            config,
            events,
        })
    }

    /// Load the agent roster named by the config.
    fn agents(&self) -> Result<AgentsConfig> {
        let path = self.config.agents_path(&self.ctx.state_dir);
        AgentsConfig::load(&path)?.ok_or_else(|| {
            SprintError::UserError(format!(
                "agent roster not found at '{}'\n\n\
                 Run `sprintctl init` to create a sample roster, or point \
                 `agents_file` in config.yaml at an existing one.",
                path.display()
            ))
        })
    }
}

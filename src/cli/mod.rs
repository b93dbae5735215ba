//! CLI argument parsing for sprintctl.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// sprintctl: delegate sprint tasks to capability-matched agents.
///
/// Tasks come from a sprint file, are ordered by their dependencies, and are
/// handed one by one to the agent whose declared task types and technologies
/// fit best. A failed task blocks everything that depends on it.
#[derive(Parser, Debug)]
#[command(name = "sprintctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for sprintctl.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a workspace in the current directory.
    ///
    /// Creates `.sprintctl/` with a default config, a sample agent roster,
    /// and the events directory. Existing files are left untouched.
    Init,

    /// Inspect the agent roster.
    Agents(AgentsCommand),

    /// Plan or run a sprint file.
    Sprint(SprintCommand),

    /// Manage roadmaps and milestones.
    Roadmap(RoadmapCommand),
}

#[derive(Parser, Debug)]
pub struct AgentsCommand {
    #[command(subcommand)]
    pub action: AgentsAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentsAction {
    /// List configured agents and their capabilities.
    List,

    /// Show which agent a task with the given type and technologies would go to.
    Match(AgentsMatchArgs),
}

#[derive(Parser, Debug)]
pub struct AgentsMatchArgs {
    /// Task type (e.g. implement_feature, fix_bug, deploy).
    #[arg(long = "type")]
    pub task_type: String,

    /// Technology tags, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub tech: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand, Debug)]
pub enum SprintAction {
    /// Validate a sprint file and show execution order and delegations
    /// without running anything.
    Plan(SprintPlanArgs),

    /// Run every task in a sprint file.
    ///
    /// Exits with code 2 when any task failed or was blocked.
    Run(SprintRunArgs),
}

#[derive(Parser, Debug)]
pub struct SprintPlanArgs {
    /// Path to the sprint YAML file.
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SprintRunArgs {
    /// Path to the sprint YAML file.
    pub file: PathBuf,

    /// Print results as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Override `max_parallel` from config.yaml.
    #[arg(long)]
    pub max_parallel: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct RoadmapCommand {
    #[command(subcommand)]
    pub action: RoadmapAction,
}

#[derive(Subcommand, Debug)]
pub enum RoadmapAction {
    /// Create a new roadmap.
    Create(RoadmapCreateArgs),

    /// Add a milestone to a roadmap.
    Milestone(MilestoneAddArgs),

    /// Change the target date, epics, or criteria of a milestone.
    UpdateMilestone(MilestoneUpdateArgs),

    /// List roadmaps.
    List,

    /// Show a roadmap with its milestones.
    Show(RoadmapShowArgs),
}

#[derive(Parser, Debug)]
pub struct RoadmapCreateArgs {
    /// Roadmap name.
    pub name: String,

    /// Vision statement.
    #[arg(long, default_value = "")]
    pub vision: String,
}

#[derive(Parser, Debug)]
pub struct MilestoneAddArgs {
    /// Roadmap ID (e.g. RM-1).
    pub roadmap_id: String,

    /// Milestone name.
    pub name: String,

    /// Target date: RFC 3339 timestamp or YYYY-MM-DD.
    #[arg(long)]
    pub target_date: String,

    /// Epic identifiers, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub epics: Vec<String>,

    /// Success criterion (repeatable).
    #[arg(long = "criteria", action = ArgAction::Append)]
    pub criteria: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct MilestoneUpdateArgs {
    /// Roadmap ID (e.g. RM-1).
    pub roadmap_id: String,

    /// Name of the milestone to update.
    pub name: String,

    /// New target date: RFC 3339 timestamp or YYYY-MM-DD.
    #[arg(long)]
    pub target_date: Option<String>,

    /// Replacement epic list, comma-separated.
    #[arg(long, value_delimiter = ',')]
    pub epics: Option<Vec<String>>,

    /// Replacement success criterion (repeatable; replaces all criteria).
    #[arg(long = "criteria", action = ArgAction::Append)]
    pub criteria: Option<Vec<String>>,
}

#[derive(Parser, Debug)]
pub struct RoadmapShowArgs {
    /// Roadmap ID (e.g. RM-1).
    pub roadmap_id: String,
}

//! Agent roster, delegation, and execution.
//!
//! - **Config**: the `agents.yaml` roster (capabilities plus execution settings)
//! - **Registry**: immutable capability sets used for eligibility lookup
//! - **Resolver**: deterministic selection of exactly one agent per task
//! - **Executor**: the capability that actually runs a task for an agent
//!
//! Registry and resolver never touch the filesystem or spawn processes;
//! everything with side effects sits behind [`TaskExecutor`].

mod config;
mod executor;
mod registry;
mod resolver;
mod template;

pub use config::{AgentDefaults, AgentProfile, AgentsConfig, default_agents_yaml};
pub use executor::{CommandExecutor, TaskExecutor};
pub use registry::{AgentDescriptor, AgentRegistry};
pub use resolver::{DecidedBy, Delegation, Resolver};
pub use template::{TemplateError, render_template};

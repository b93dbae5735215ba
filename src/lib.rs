//! sprintctl: capability-based delegation of sprint tasks to agents.
//!
//! A sprint is a batch of typed tasks with dependencies and technology tags.
//! The [`sprint::Scheduler`] validates the batch, orders it, resolves one
//! agent per task through the [`agent::Resolver`], and hands each task to a
//! [`agent::TaskExecutor`]. Failures are isolated to the failing task and
//! everything that depends on it.
//!
//! Roadmaps ([`roadmap::RoadmapStore`]) group work over time as dated
//! milestones and live in a single JSON file.

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod roadmap;
pub mod sprint;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;

//! Sprint scheduling: dependency ordering, delegation, and execution.
//!
//! A sprint is a batch of tasks. The batch is validated as a whole (unique
//! identifiers, known dependencies, no cycles) before any agent is invoked.
//! Once execution starts, a failing task only affects its transitive
//! dependents, which are reported as blocked.

mod graph;
mod scheduler;


pub use graph::execution_order;
pub use scheduler::{PlanEntry, Scheduler, SprintReport};

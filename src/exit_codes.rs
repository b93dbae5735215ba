//! Exit code constants for the sprintctl CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid input files, IO failures)
//! - 2: Sprint finished but one or more tasks failed or were blocked
//! - 3: Scheduling failure (cyclic or unknown dependency)
//! - 4: Delegation failure (no eligible or ambiguous agent)
//! - 5: Lookup failure (roadmap or milestone not found)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable or invalid input.
pub const USER_ERROR: i32 = 1;

/// The sprint ran to completion with at least one unsuccessful task.
pub const TASK_FAILURE: i32 = 2;

/// The batch was rejected before execution because its dependency graph is invalid.
pub const SCHEDULING_FAILURE: i32 = 3;

/// No single agent could be selected for a task.
pub const DELEGATION_FAILURE: i32 = 4;

/// A roadmap or milestone referenced by the caller does not exist.
pub const NOT_FOUND: i32 = 5;

//! Error types for sprintctl.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for sprintctl operations.
///
/// Delegation and scheduling variants carry the identifiers needed to fix the
/// input; each variant maps to a process exit code.
#[derive(Error, Debug)]
pub enum SprintError {
    /// User provided invalid arguments or input, or an IO operation failed.
    #[error("{0}")]
    UserError(String),

    /// No enabled agent supports the task's type and technology constraints.
    #[error("no eligible agent for task '{task_id}' (type: {task_type}, technologies: {technologies})")]
    NoEligibleAgent {
        task_id: String,
        task_type: String,
        technologies: String,
    },

    /// More than one agent survived every tie-break rule.
    #[error("ambiguous delegation for task '{task_id}': candidates {}", .candidates.join(", "))]
    AmbiguousDelegation {
        task_id: String,
        candidates: Vec<String>,
    },

    /// The batch's dependency graph contains a cycle.
    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A task depends on an identifier that is not part of the batch.
    #[error("task '{task_id}' depends on unknown task '{dependency}'")]
    UnknownDependency { task_id: String, dependency: String },

    /// The sprint completed but some tasks did not succeed.
    #[error("{failed} of {total} task(s) did not succeed")]
    TasksFailed { failed: usize, total: usize },

    /// No roadmap with the given identifier exists in the store.
    #[error("roadmap '{0}' not found")]
    RoadmapNotFound(String),

    /// The roadmap has no milestone with the given name.
    #[error("milestone '{milestone}' not found in roadmap '{roadmap_id}'")]
    MilestoneNotFound {
        roadmap_id: String,
        milestone: String,
    },

    /// The agent execution environment itself failed.
    #[error("executor fault: {0}")]
    ExecutorFault(String),
}

impl SprintError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SprintError::UserError(_) | SprintError::ExecutorFault(_) => exit_codes::USER_ERROR,
            SprintError::TasksFailed { .. } => exit_codes::TASK_FAILURE,
            SprintError::CyclicDependency { .. } | SprintError::UnknownDependency { .. } => {
                exit_codes::SCHEDULING_FAILURE
            }
            SprintError::NoEligibleAgent { .. } | SprintError::AmbiguousDelegation { .. } => {
                exit_codes::DELEGATION_FAILURE
            }
            SprintError::RoadmapNotFound(_) | SprintError::MilestoneNotFound { .. } => {
                exit_codes::NOT_FOUND
            }
        }
    }
}

/// Result type alias for sprintctl operations.
pub type Result<T> = std::result::Result<T, SprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_has_correct_exit_code() {
        let err = SprintError::UserError("bad argument".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn scheduling_errors_share_exit_code() {
        let cycle = SprintError::CyclicDependency {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        let unknown = SprintError::UnknownDependency {
            task_id: "A".to_string(),
            dependency: "Z".to_string(),
        };
        assert_eq!(cycle.exit_code(), exit_codes::SCHEDULING_FAILURE);
        assert_eq!(unknown.exit_code(), exit_codes::SCHEDULING_FAILURE);
    }

    #[test]
    fn delegation_errors_have_correct_exit_code() {
        let err = SprintError::NoEligibleAgent {
            task_id: "T-1".to_string(),
            task_type: "deploy".to_string(),
            technologies: "(any)".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::DELEGATION_FAILURE);
    }

    #[test]
    fn not_found_errors_have_correct_exit_code() {
        let err = SprintError::RoadmapNotFound("RM-9".to_string());
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = SprintError::CyclicDependency {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(err.to_string(), "cyclic dependency: A -> B -> A");

        let err = SprintError::AmbiguousDelegation {
            task_id: "T-1".to_string(),
            candidates: vec!["alpha".to_string(), "beta".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous delegation for task 'T-1': candidates alpha, beta"
        );

        let err = SprintError::UnknownDependency {
            task_id: "B".to_string(),
            dependency: "X".to_string(),
        };
        assert_eq!(err.to_string(), "task 'B' depends on unknown task 'X'");
    }
}

//! Task-agent delegation.
//!
//! # Resolution Order
//!
//! Candidates are the registry's eligible agents for the task. While more
//! than one remains:
//!
//! 1. Technology fit: agents whose technologies cover every task tag, then
//!    agents covering some tags, then wildcard agents (no technologies).
//!    Skipped when the task has no tags.
//! 2. Specificity: the smallest declared technology set wins; an empty set
//!    counts as the largest.
//! 3. Lexicographically smallest agent identifier, unless disabled.
//!
//! Resolution reads the registry only and returns the same answer for the
//! same task and registry every time.

use super::registry::{AgentDescriptor, AgentRegistry};
use crate::error::{Result, SprintError};
use crate::task::Task;

/// The agent chosen for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation<'a> {
    pub agent_id: &'a str,
    /// The rule that narrowed the candidates to one.
    pub decided_by: DecidedBy,
}

/// Which resolution step produced the final choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecidedBy {
    /// Only one agent was eligible.
    SingleCandidate,
    TechnologyFit,
    Specificity,
    Lexicographic,
}

impl std::fmt::Display for DecidedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecidedBy::SingleCandidate => write!(f, "single candidate"),
            DecidedBy::TechnologyFit => write!(f, "technology fit"),
            DecidedBy::Specificity => write!(f, "specificity"),
            DecidedBy::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

/// Picks exactly one agent per task from an [`AgentRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a AgentRegistry,
    lexicographic_tie_break: bool,
}

impl<'a> Resolver<'a> {
    /// A resolver with every tie-break rule enabled.
    pub fn new(registry: &'a AgentRegistry) -> Self {
        Self {
            registry,
            lexicographic_tie_break: true,
        }
    }

    /// Enable or disable the final lexicographic tie-break. When disabled,
    /// residual ties fail with [`SprintError::AmbiguousDelegation`].
    pub fn with_lexicographic_tie_break(mut self, enabled: bool) -> Self {
        self.lexicographic_tie_break = enabled;
        self
    }

    /// Resolve the agent for `task`.
    ///
    /// # Errors
    ///
    /// - [`SprintError::NoEligibleAgent`] when no enabled agent supports the
    ///   task's type and technologies
    /// - [`SprintError::AmbiguousDelegation`] when the lexicographic
    ///   tie-break is disabled and several agents remain tied
    pub fn resolve(&self, task: &Task) -> Result<Delegation<'a>> {
        // Registry iteration is in identifier order, and every filter below
        // preserves it.
        let mut candidates: Vec<&'a AgentDescriptor> = self
            .registry
            .iter()
            .filter(|a| a.is_eligible(task.task_type, &task.tech_constraints))
            .collect();

        if candidates.is_empty() {
            return Err(SprintError::NoEligibleAgent {
                task_id: task.id.clone(),
                task_type: task.task_type.to_string(),
                technologies: task.tech_display(),
            });
        }
        if candidates.len() == 1 {
            return Ok(decided(candidates[0], DecidedBy::SingleCandidate));
        }

        if !task.tech_constraints.is_empty() {
            retain_min_by_key(&mut candidates, |a| fit_tier(a, task));
            if candidates.len() == 1 {
                return Ok(decided(candidates[0], DecidedBy::TechnologyFit));
            }
        }

        retain_min_by_key(&mut candidates, |a| specificity(a));
        if candidates.len() == 1 {
            return Ok(decided(candidates[0], DecidedBy::Specificity));
        }

        if self.lexicographic_tie_break {
            return Ok(decided(candidates[0], DecidedBy::Lexicographic));
        }

        Err(SprintError::AmbiguousDelegation {
            task_id: task.id.clone(),
            candidates: candidates.iter().map(|a| a.id.clone()).collect(),
        })
    }
}

fn decided(agent: &AgentDescriptor, decided_by: DecidedBy) -> Delegation<'_> {
    Delegation {
        agent_id: &agent.id,
        decided_by,
    }
}

/// 0 = covers every task tag, 1 = covers some, 2 = wildcard.
fn fit_tier(agent: &AgentDescriptor, task: &Task) -> u8 {
    if agent.technologies.is_empty() {
        2
    } else if agent.technologies.is_superset(&task.tech_constraints) {
        0
    } else {
        1
    }
}

fn specificity(agent: &AgentDescriptor) -> usize {
    if agent.technologies.is_empty() {
        usize::MAX
    } else {
        agent.technologies.len()
    }
}

fn retain_min_by_key<T, K, F>(items: &mut Vec<T>, key: F)
where
    K: Ord + Copy,
    F: Fn(&T) -> K,
{
    if let Some(min) = items.iter().map(&key).min() {
        items.retain(|item| key(item) == min);
    }
}

//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for sprint scheduling.
///
/// This struct represents the contents of `.sprintctl/config.yaml`.
/// Unknown fields are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of tasks executing at the same time.
    /// 1 runs tasks strictly one after another in planned order.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: u32,

    /// Whether residual delegation ties go to the lexicographically smallest
    /// agent id. When false they fail with an ambiguous-delegation error.
    #[serde(default = "default_true")]
    pub lexicographic_tie_break: bool,

    /// Agent roster, relative to `.sprintctl/` unless absolute.
    #[serde(default = "default_agents_file")]
    pub agents_file: String,

    /// Roadmap store, relative to `.sprintctl/` unless absolute.
    #[serde(default = "default_roadmap_file")]
    pub roadmap_file: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            lexicographic_tie_break: default_true(),
            agents_file: default_agents_file(),
            roadmap_file: default_roadmap_file(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_max_parallel() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_agents_file() -> String {
    "agents.yaml".to_string()
}

fn default_roadmap_file() -> String {
    "roadmaps.json".to_string()
}

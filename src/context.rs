//! Workspace resolution for sprintctl.
//!
//! A workspace is any directory containing a `.sprintctl/` state directory.
//! Commands locate it by walking up from the current directory, so they work
//! from any subdirectory of the project.
//!
//! ```text
//! <root>/
//!   └── .sprintctl/
//!         ├── config.yaml
//!         ├── agents.yaml
//!         ├── roadmaps.json
//!         ├── events/events.ndjson
//!         └── logs/<task_id>/{task.json,stdout.log,stderr.log}
//! ```

use crate::config::Config;
use crate::error::{Result, SprintError};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the state directory marking a workspace root.
pub const STATE_DIR_NAME: &str = ".sprintctl";

/// Resolved paths for a sprintctl workspace. All paths are absolute when the
/// context was resolved from an absolute directory.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    /// Directory containing `.sprintctl/`; agent commands run here.
    pub root: PathBuf,

    /// `{root}/.sprintctl/`
    pub state_dir: PathBuf,

    /// `{root}/.sprintctl/events/`
    pub events_dir: PathBuf,

    /// `{root}/.sprintctl/logs/`
    pub logs_dir: PathBuf,
}

impl WorkspaceContext {
    /// Context for a workspace rooted at `root`, whether or not it exists yet.
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let state_dir = root.join(STATE_DIR_NAME);
        Self {
            events_dir: state_dir.join("events"),
            logs_dir: state_dir.join("logs"),
            state_dir,
            root,
        }
    }

    /// Resolve the workspace from the current working directory.
    ///
    /// # Returns
    ///
    /// * `Ok(WorkspaceContext)` - The nearest enclosing workspace
    /// * `Err(SprintError::UserError)` - No enclosing workspace (exit code 1)
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            SprintError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        Self::resolve_from(&cwd)
    }

    /// Resolve the workspace enclosing `start`.
    pub fn resolve_from<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();

        start
            .ancestors()
            .find(|dir| dir.join(STATE_DIR_NAME).is_dir())
            .map(Self::at)
            .ok_or_else(|| {
                SprintError::UserError(format!(
                    "no sprintctl workspace found in '{}' or any parent directory.\n\n\
                     Run `sprintctl init` to create one.",
                    start.display()
                ))
            })
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    pub fn events_path(&self) -> PathBuf {
        self.events_dir.join("events.ndjson")
    }

    pub fn is_initialized(&self) -> bool {
        self.state_dir.is_dir()
    }

    /// Load `config.yaml`, falling back to defaults when it is absent.
    pub fn load_config(&self) -> Result<Config> {
        let path = self.config_path();
        if path.exists() {
            Config::load(&path)
        } else {
            Ok(Config::default())
        }
    }
}

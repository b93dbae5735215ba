//! Task execution capability.
//!
//! [`TaskExecutor`] is the only seam between the scheduler and whatever
//! actually performs an agent's work. [`CommandExecutor`] is the shipped
//! implementation: it runs the agent's configured command as a subprocess.

use super::config::AgentsConfig;
use super::template::render_template;
use crate::error::{Result, SprintError};
use crate::fs::atomic_write_file;
use crate::task::{Task, TaskResult};
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Performs the work of one task on behalf of one agent.
///
/// Expected failures (the agent reports failure, exits non-zero, times out)
/// must be returned as `Ok` results with `success == false`. `Err` is
/// reserved for faults in the execution environment itself.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: &Task, agent_id: &str) -> Result<TaskResult>;
}

/// Runs each agent's `command` template as a subprocess.
///
/// For every task a directory `<logs_dir>/<task_id>/` receives:
/// - `task.json`: the serialized task, passed to the command as `{task_file}`
/// - `stdout.log` / `stderr.log`: captured process output
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    agents: AgentsConfig,
    logs_dir: PathBuf,
    working_dir: PathBuf,
}

impl CommandExecutor {
    pub fn new(
        agents: AgentsConfig,
        logs_dir: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            agents,
            logs_dir: logs_dir.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Directory holding the task file and logs for `task_id`.
    pub fn task_logs_dir(&self, task_id: &str) -> PathBuf {
        self.logs_dir.join(path_safe(task_id))
    }
}

impl TaskExecutor for CommandExecutor {
    fn execute(&self, task: &Task, agent_id: &str) -> Result<TaskResult> {
        let Some(profile) = self.agents.get(agent_id) else {
            return Ok(TaskResult::failed(
                &task.id,
                Some(agent_id.to_string()),
                format!("agent '{}' is not configured", agent_id),
            ));
        };
        let Some(template) = profile.command.as_deref() else {
            return Ok(TaskResult::failed(
                &task.id,
                Some(agent_id.to_string()),
                format!("agent '{}' has no command configured", agent_id),
            ));
        };

        let task_dir = self.task_logs_dir(&task.id);
        std::fs::create_dir_all(&task_dir).map_err(|e| {
            SprintError::ExecutorFault(format!(
                "failed to create task log directory '{}': {}",
                task_dir.display(),
                e
            ))
        })?;

        let task_file = task_dir.join("task.json");
        let task_json = serde_json::to_string_pretty(task)
            .map_err(|e| SprintError::UserError(format!("failed to serialize task: {}", e)))?;
        atomic_write_file(&task_file, &task_json)?;

        let variables = HashMap::from([
            ("task_id".to_string(), task.id.clone()),
            ("task_type".to_string(), task.task_type.to_string()),
            ("agent_id".to_string(), agent_id.to_string()),
            ("task_file".to_string(), task_file.display().to_string()),
            ("description".to_string(), task.description.clone()),
        ]);

        let command_str = render_template(template, &variables).map_err(|e| {
            SprintError::UserError(format!(
                "agent '{}' command template is invalid: {}\nCommand: {}",
                agent_id, e, template
            ))
        })?;

        let args = shell_words::split(&command_str).map_err(|e| {
            SprintError::UserError(format!(
                "failed to parse agent command '{}': {}\n\
                 Fix: check for unmatched quotes or invalid escape sequences.",
                command_str, e
            ))
        })?;
        let Some((program, program_args)) = args.split_first() else {
            return Err(SprintError::UserError(format!(
                "agent '{}' command is empty after parsing",
                agent_id
            )));
        };

        let stdout_path = task_dir.join("stdout.log");
        let stderr_path = task_dir.join("stderr.log");
        let stdout_file = create_log(&stdout_path)?;
        let stderr_file = create_log(&stderr_path)?;

        let mut command = Command::new(program);
        command
            .args(program_args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file))
            .envs(&profile.environment);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|e| {
            SprintError::ExecutorFault(format!(
                "failed to execute agent command '{}': {}\n\
                 Fix: ensure the command is installed and in PATH.",
                program, e
            ))
        })?;

        let timeout_seconds = profile.effective_timeout(&self.agents.defaults);
        let (exit_code, timed_out) =
            wait_with_timeout(&mut child, Duration::from_secs(timeout_seconds))?;
        let duration = started.elapsed();

        let message = match (timed_out, exit_code) {
            (true, _) => format!("agent timed out after {}s", timeout_seconds),
            (false, Some(0)) => "agent completed successfully".to_string(),
            (false, Some(code)) => format!("agent exited with code {}", code),
            (false, None) => "agent terminated by signal".to_string(),
        };

        let mut result = if !timed_out && exit_code == Some(0) {
            TaskResult::succeeded(&task.id, agent_id, message)
        } else {
            TaskResult::failed(&task.id, Some(agent_id.to_string()), message)
        };
        result = result
            .with_artifact("command", json!(command_str))
            .with_artifact("exit_code", json!(exit_code))
            .with_artifact("timed_out", json!(timed_out))
            .with_artifact("duration_ms", json!(duration.as_millis() as u64))
            .with_artifact("stdout_log", json!(stdout_path.display().to_string()))
            .with_artifact("stderr_log", json!(stderr_path.display().to_string()));

        Ok(result)
    }
}

fn create_log(path: &Path) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|e| {
        SprintError::ExecutorFault(format!(
            "failed to create log file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Wait for a child process, killing it once `timeout` elapses.
///
/// Returns `(exit_code, timed_out)`.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(50);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) if start.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Ok((None, true));
            }
            Ok(None) => std::thread::sleep(poll_interval),
            Err(e) => {
                return Err(SprintError::ExecutorFault(format!(
                    "failed to check agent process status: {}",
                    e
                )));
            }
        }
    }
}

/// Map a task identifier to a single safe path component.
///
/// Characters outside `[A-Za-z0-9._-]` (and a leading `.`) are written as
/// `%XX` per UTF-8 byte, so distinct identifiers never share a directory.
fn path_safe(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for (i, c) in id.chars().enumerate() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') || (c == '.' && i > 0) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    out
}

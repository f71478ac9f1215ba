use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use clarity_core::api::{HttpTaskBackend, ListParams};
use clarity_core::clock::{FileActivityCache, SystemClock};
use clarity_core::config::ClientConfig;
use clarity_core::probe::{AvailabilityProber, ProbeMode, ProbeOutcome};
use clarity_core::tasks::{TaskList, TaskReconciler};
use clarity_core::util::normalize_text_option;
use clarity_core::{Task, TaskFilter, TaskId};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::auth::load_stored_token;
use crate::config_profiles::{CliProfilesConfig, API_BASE_URL_ENV};
use crate::error::CliError;

pub type CliReconciler = TaskReconciler<HttpTaskBackend, SystemClock>;
pub type CliProber = AvailabilityProber<HttpTaskBackend, FileActivityCache, SystemClock>;

/// Resolved profile and client configuration for one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub profile_name: String,
    pub config: ClientConfig,
}

impl CommandContext {
    pub fn resolve(global_profile: Option<&str>) -> Result<Self, CliError> {
        let profiles = CliProfilesConfig::load().map_err(CliError::Config)?;
        let profile_name = profiles.resolve_profile_name(global_profile);
        let profile = profiles.profile(&profile_name).cloned().unwrap_or_default();
        let config = profile.client_config(std::env::var(API_BASE_URL_ENV).ok())?;
        tracing::debug!(
            "Using profile '{}' ({} mode, {})",
            profile_name,
            config.persistence,
            config.api_base_url
        );
        Ok(Self {
            profile_name,
            config,
        })
    }

    pub fn remote_backend(&self) -> Result<HttpTaskBackend, CliError> {
        let token = load_stored_token(&self.profile_name)?;
        Ok(HttpTaskBackend::new(&self.config)?.with_token(token))
    }

    pub fn prober(&self, backend: HttpTaskBackend) -> Result<CliProber, CliError> {
        let cache = FileActivityCache::new(activity_cache_path()?);
        Ok(AvailabilityProber::new(backend, cache, SystemClock, &self.config))
    }

    pub fn tasks_path(&self) -> Result<PathBuf, CliError> {
        let file_name = if self.profile_name == "default" {
            "tasks.json".to_string()
        } else {
            format!("tasks-{}.json", self.profile_name)
        };
        Ok(data_dir()?.join(file_name))
    }
}

fn data_dir() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("clarity"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn activity_cache_path() -> Result<PathBuf, CliError> {
    dirs::cache_dir()
        .map(|dir| dir.join("clarity").join("server-last-active"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI cache directory".to_string()))
}

/// Block until the backend is reachable, printing a notice while it wakes up.
pub async fn wait_for_backend(prober: &CliProber) -> Result<ProbeOutcome, CliError> {
    if !prober.cache_is_fresh() {
        eprintln!("Connecting to server...");
    }
    let cancel = CancellationToken::new();
    let outcome = tokio::select! {
        outcome = prober.check(ProbeMode::Foreground, &cancel) => outcome,
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            return Err(CliError::Interrupted);
        }
    };
    match outcome {
        ProbeOutcome::CacheHit | ProbeOutcome::Reachable { .. } => Ok(outcome),
        ProbeOutcome::Cancelled => Err(CliError::Interrupted),
        ProbeOutcome::BackgroundFailed | ProbeOutcome::Exhausted { .. } => {
            Err(CliError::ServerUnavailable)
        }
    }
}

/// Reconciler for the profile's persistence mode.
///
/// Remote mode waits for the backend and loads the list with `params`;
/// local mode reads the task snapshot file.
pub async fn open_reconciler(
    context: &CommandContext,
    params: &ListParams,
) -> Result<CliReconciler, CliError> {
    if !context.config.is_remote() {
        let tasks = load_task_snapshot(&context.tasks_path()?)?;
        return Ok(TaskReconciler::local(SystemClock).with_tasks(tasks));
    }

    let backend = context.remote_backend()?;
    wait_for_backend(&context.prober(backend.clone())?).await?;
    let mut reconciler = TaskReconciler::remote(backend, SystemClock);
    reconciler.load(params).await?;
    Ok(reconciler)
}

/// Write local-mode changes back to the snapshot file.
pub fn persist(context: &CommandContext, reconciler: &CliReconciler) -> Result<(), CliError> {
    if reconciler.is_remote() {
        return Ok(());
    }
    save_task_snapshot(&context.tasks_path()?, reconciler.tasks())
}

pub fn load_task_snapshot(path: &Path) -> Result<Vec<Task>, CliError> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(error) => Err(CliError::Io(error)),
    }
}

pub fn save_task_snapshot(path: &Path, tasks: &[Task]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(tasks)?)?;
    Ok(())
}

pub fn parse_task_id(raw: &str) -> Result<TaskId, CliError> {
    Ok(raw.parse::<TaskId>()?)
}

pub fn resolve_description(parts: &[String]) -> Result<String, CliError> {
    normalize_text_option(Some(parts.join(" "))).ok_or(CliError::EmptyDescription)
}

#[derive(Debug, Serialize)]
pub struct TaskListItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub due_date: Option<String>,
    pub added_at: i64,
    pub added: String,
}

pub fn task_to_list_item(task: &Task) -> TaskListItem {
    TaskListItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        completed: task.is_completed,
        due_date: task.due_date.clone(),
        added_at: task.added_at,
        added: task.added_label(),
    }
}

pub fn format_task_line(task: &Task) -> String {
    let mark = if task.is_completed { "[x]" } else { "[ ]" };
    let title = title_preview(&task.title, 40);
    format!(
        "{:<24}  {mark} {title:<40}  {:<10}  {}",
        task.id.as_str(),
        task.due_date_label(),
        task.added_label()
    )
}

pub fn format_task_lines(tasks: &[&Task]) -> Vec<String> {
    tasks.iter().map(|task| format_task_line(task)).collect()
}

pub fn format_counts(list: &TaskList) -> String {
    TaskFilter::ALL
        .iter()
        .map(|filter| format!("{filter}: {}", list.count(*filter)))
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn title_preview(title: &str, max_chars: usize) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Ask a yes/no question; anything but `y`/`yes` (including EOF) is a no.
pub fn prompt_confirmation<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

pub fn format_age(timestamp_ms: i64) -> String {
    let age_secs = Utc::now()
        .timestamp_millis()
        .saturating_sub(timestamp_ms)
        / 1000;
    if age_secs < 60 {
        format!("{age_secs}s ago")
    } else {
        format!("{}m ago", age_secs / 60)
    }
}

//! Task model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Label rendered for tasks without a due date.
pub const NO_DUE_DATE: &str = "No Date";

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A task identifier.
///
/// Local-only tasks use the creation time in milliseconds; backend tasks use
/// whatever opaque id the server assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a backend-assigned identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for a locally created task.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("Task ID cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, immutable once assigned
    pub id: TaskId,
    /// Non-empty description of the work item
    pub title: String,
    /// Completion flag
    pub is_completed: bool,
    /// Optional due date (`YYYY-MM-DD`)
    #[serde(default)]
    pub due_date: Option<String>,
    /// Creation timestamp (Unix ms), display-only
    pub added_at: i64,
}

impl Task {
    /// Build a task from a validated draft.
    pub fn from_draft(id: TaskId, draft: &TaskDraft, added_at: i64) -> Result<Self> {
        Ok(Self {
            id,
            title: draft.title()?,
            is_completed: draft.is_completed,
            due_date: draft.due_date()?,
            added_at,
        })
    }

    /// Due date for display, `"No Date"` when absent.
    #[must_use]
    pub fn due_date_label(&self) -> &str {
        self.due_date.as_deref().unwrap_or(NO_DUE_DATE)
    }

    /// Short creation date label such as `"Oct 24"`.
    #[must_use]
    pub fn added_label(&self) -> String {
        DateTime::from_timestamp_millis(self.added_at).map_or_else(
            || self.added_at.to_string(),
            |date_time| date_time.format("%b %-d").to_string(),
        )
    }

    /// Case-insensitive substring match against the title.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn title_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.title.to_lowercase().contains(needle)
    }

    fn apply_edit(&mut self, edit: &TaskEdit) -> Result<()> {
        let title = normalize_title(&edit.title)?;
        let due_date = normalize_due_date(edit.due_date.as_deref())?;
        self.title = title;
        self.is_completed = edit.is_completed;
        self.due_date = due_date;
        Ok(())
    }

    /// Return a copy with the edit applied, leaving `self` untouched.
    pub fn edited(&self, edit: &TaskEdit) -> Result<Self> {
        let mut task = self.clone();
        task.apply_edit(edit)?;
        Ok(task)
    }
}

/// Input collected by the "add task" flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub description: String,
    /// Raw due date input; empty means no due date
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl TaskDraft {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    #[must_use]
    pub const fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }

    /// Whether the add action is enabled for this draft.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.description.trim().is_empty()
    }

    /// Trimmed title, rejecting whitespace-only descriptions.
    pub fn title(&self) -> Result<String> {
        normalize_title(&self.description)
    }

    /// Normalized due date, `None` when left blank.
    pub fn due_date(&self) -> Result<Option<String>> {
        normalize_due_date(Some(&self.due_date))
    }
}

/// Replacement values collected by the "edit task" flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEdit {
    pub title: String,
    pub is_completed: bool,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl TaskEdit {
    /// Prefill an edit from the current task values.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            is_completed: task.is_completed,
            due_date: task.due_date.clone(),
        }
    }

    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

fn normalize_title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput(
            "Task description cannot be empty".to_string(),
        ))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate an optional `YYYY-MM-DD` due date.
///
/// Blank input and the `"No Date"` label both mean "no due date".
pub fn normalize_due_date(raw: Option<&str>) -> Result<Option<String>> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    if value == NO_DUE_DATE {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DUE_DATE_FORMAT)
        .map(|date| Some(date.format(DUE_DATE_FORMAT).to_string()))
        .map_err(|_| Error::InvalidInput(format!("Due date must be YYYY-MM-DD, got '{value}'")))
}

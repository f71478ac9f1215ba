//! JSON shapes exchanged with the `/todo` endpoints.

use chrono::{DateTime, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskId};

/// A todo as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub to_be_completed_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<TodoRecord> for Task {
    fn from(record: TodoRecord) -> Self {
        let due_date = record.to_be_completed_by.as_deref().and_then(date_from_instant);
        let added_at = record
            .created_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or_else(
                || {
                    tracing::warn!("Todo {} has no parseable createdAt", record.id);
                    0
                },
                |created| created.timestamp_millis(),
            );

        Self {
            id: TaskId::new(record.id),
            title: record.title,
            is_completed: record.completed,
            due_date,
            added_at,
        }
    }
}

/// Body of `POST /todo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateTodo<'a> {
    pub title: &'a str,
    pub to_be_completed_by: String,
}

/// Partial body of `PATCH /todo/{id}`; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_be_completed_by: Option<String>,
}

impl TaskChanges {
    #[must_use]
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Full replacement of the editable fields of `task`.
    #[must_use]
    pub fn replace_with(task: &Task) -> Self {
        Self {
            title: Some(task.title.clone()),
            completed: Some(task.is_completed),
            to_be_completed_by: task.due_date.as_deref().and_then(instant_from_date),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.to_be_completed_by.is_none()
    }
}

/// RFC 3339 instant at UTC midnight of a `YYYY-MM-DD` date.
pub(crate) fn instant_from_date(date: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    Some(midnight.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn date_from_instant(raw: &str) -> Option<String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.date_naive().format("%Y-%m-%d").to_string());
    }
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn record_maps_to_task() {
        let record: TodoRecord = serde_json::from_str(
            r#"{
                "_id": "665f1c",
                "title": "Renew gym membership",
                "completed": false,
                "toBeCompletedBy": "2024-11-05T00:00:00.000Z",
                "createdAt": "2024-10-24T09:30:00.000Z"
            }"#,
        )
        .unwrap();

        let task = Task::from(record);
        assert_eq!(
            task,
            Task {
                id: TaskId::new("665f1c"),
                title: "Renew gym membership".to_string(),
                is_completed: false,
                due_date: Some("2024-11-05".to_string()),
                added_at: 1_729_762_200_000,
            }
        );
    }

    #[test]
    fn record_without_dates_has_no_due_date() {
        let record: TodoRecord =
            serde_json::from_str(r#"{"_id": "a", "title": "Loose end"}"#).unwrap();
        let task = Task::from(record);
        assert_eq!(task.due_date, None);
        assert_eq!(task.added_at, 0);
    }

    #[test]
    fn changes_skip_unset_fields() {
        let body = serde_json::to_value(TaskChanges::completed(true)).unwrap();
        assert_eq!(body, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn instant_from_date_is_utc_midnight() {
        assert_eq!(
            instant_from_date("2024-10-28").as_deref(),
            Some("2024-10-28T00:00:00.000Z")
        );
        assert_eq!(instant_from_date("tomorrow"), None);
    }
}

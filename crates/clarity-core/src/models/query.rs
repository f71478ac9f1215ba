//! Filter, search and sort projections over a task collection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::Task;

/// Completion-state filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed,
            Self::Completed => task.is_completed,
        }
    }

    /// Value of the backend `completed` query parameter, if any.
    #[must_use]
    pub const fn completed_param(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        };
        f.write_str(label)
    }
}

impl FromStr for TaskFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(Error::InvalidInput(format!("Unknown filter '{other}'"))),
        }
    }
}

/// Ordering applied to a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Newest first by creation time
    Created,
    /// Earliest due date first, undated tasks last
    DueDate,
}

impl SortKey {
    /// Value of the backend `sort` query parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DueDate => "toBeCompletedBy",
        }
    }

    fn compare(self, left: &Task, right: &Task) -> Ordering {
        match self {
            Self::Created => right.added_at.cmp(&left.added_at),
            Self::DueDate => match (&left.due_date, &right.due_date) {
                (Some(left), Some(right)) => left.cmp(right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// A filter + search + optional sort request.
///
/// Both predicates compose with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub search: String,
    pub sort: Option<SortKey>,
}

impl TaskQuery {
    #[must_use]
    pub fn new(filter: TaskFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Apply the query to `tasks`, borrowing matches in projection order.
    #[must_use]
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let needle = self.search.to_lowercase();
        let mut matches = tasks
            .iter()
            .filter(|task| task.title_contains(&needle))
            .filter(|task| self.filter.matches(task))
            .collect::<Vec<_>>();

        if let Some(sort) = self.sort {
            matches.sort_by(|left, right| sort.compare(left, right));
        }
        matches
    }
}

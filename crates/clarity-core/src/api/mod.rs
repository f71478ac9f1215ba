//! Repository-style seam between Clarity and its REST backend.
//!
//! [`TaskBackend`] is the only way the prober and the reconciler talk to the
//! network, so both can be exercised against in-memory fakes.

mod http;
mod wire;

use std::future::Future;

pub use http::HttpTaskBackend;
pub use wire::{TaskChanges, TodoRecord};

use crate::error::Result;
use crate::models::{SortKey, Task, TaskId, TaskQuery};

/// Query parameters accepted by `GET /todo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub completed: Option<bool>,
    pub sort: Option<SortKey>,
    pub search: Option<String>,
}

impl ListParams {
    /// Server-side equivalent of a local projection query.
    #[must_use]
    pub fn from_query(query: &TaskQuery) -> Self {
        let search = query.search.trim();
        Self {
            completed: query.filter.completed_param(),
            sort: query.sort,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    /// Query pairs in wire form, omitting unset parameters.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(completed) = self.completed {
            pairs.push(("completed", if completed { "yes" } else { "no" }.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_param().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// Remote task persistence plus the health probe.
pub trait TaskBackend: Send + Sync {
    /// Single health check; `Ok` only for a 2xx answer.
    fn probe(&self) -> impl Future<Output = Result<()>> + Send;

    fn list_tasks(&self, params: &ListParams) -> impl Future<Output = Result<Vec<Task>>> + Send;

    fn create_task(
        &self,
        title: &str,
        due_date: Option<&str>,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn update_task(
        &self,
        id: &TaskId,
        changes: &TaskChanges,
    ) -> impl Future<Output = Result<Task>> + Send;

    fn delete_task(&self, id: &TaskId) -> impl Future<Output = Result<Task>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskFilter;

    #[test]
    fn default_params_produce_no_pairs() {
        assert!(ListParams::default().to_pairs().is_empty());
    }

    #[test]
    fn params_follow_query() {
        let query = TaskQuery::new(TaskFilter::Active)
            .with_search("  gym ")
            .with_sort(SortKey::DueDate);
        let pairs = ListParams::from_query(&query).to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("completed", "no".to_string()),
                ("sort", "toBeCompletedBy".to_string()),
                ("search", "gym".to_string()),
            ]
        );
    }

    #[test]
    fn blank_search_is_omitted() {
        let params = ListParams::from_query(&TaskQuery::new(TaskFilter::Completed).with_search(" "));
        assert_eq!(params.to_pairs(), vec![("completed", "yes".to_string())]);
    }
}

//! In-memory [`TaskBackend`] used by the prober and reconciler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use crate::api::{ListParams, TaskBackend, TaskChanges};
use crate::error::{Error, Result};
use crate::models::{Task, TaskFilter, TaskId, TaskQuery};

#[derive(Debug, Default)]
struct FakeState {
    tasks: Vec<Task>,
    probe_script: VecDeque<bool>,
    probe_default: bool,
    probe_calls: Vec<Instant>,
    fail_next_create: bool,
    fail_next_update: bool,
    fail_next_delete: bool,
    unauthorized: bool,
    next_id: u32,
    mutation_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    /// Backend whose probes succeed unless scripted otherwise.
    pub fn healthy() -> Self {
        let backend = Self::default();
        backend.lock().probe_default = true;
        backend
    }

    /// Backend whose probes fail unless scripted otherwise.
    pub fn asleep() -> Self {
        Self::default()
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.lock().tasks = tasks;
        self
    }

    /// Queue probe results consumed before falling back to the default.
    pub fn script_probes(&self, results: &[bool]) {
        self.lock().probe_script.extend(results.iter().copied());
    }

    pub fn set_probe_default(&self, healthy: bool) {
        self.lock().probe_default = healthy;
    }

    pub fn fail_next_create(&self) {
        self.lock().fail_next_create = true;
    }

    pub fn fail_next_update(&self) {
        self.lock().fail_next_update = true;
    }

    pub fn fail_next_delete(&self) {
        self.lock().fail_next_delete = true;
    }

    pub fn reject_token(&self) {
        self.lock().unauthorized = true;
    }

    pub fn probe_calls(&self) -> Vec<Instant> {
        self.lock().probe_calls.clone()
    }

    pub fn probe_count(&self) -> usize {
        self.lock().probe_calls.len()
    }

    pub fn mutation_calls(&self) -> usize {
        self.lock().mutation_calls
    }

    pub fn stored(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake backend lock poisoned")
    }
}

impl TaskBackend for FakeBackend {
    async fn probe(&self) -> Result<()> {
        let mut state = self.lock();
        state.probe_calls.push(Instant::now());
        let healthy = state
            .probe_script
            .pop_front()
            .unwrap_or(state.probe_default);
        if healthy {
            Ok(())
        } else {
            Err(Error::Api("Server not ready (HTTP 503)".to_string()))
        }
    }

    async fn list_tasks(&self, params: &ListParams) -> Result<Vec<Task>> {
        let state = self.lock();
        if state.unauthorized {
            return Err(Error::Unauthorized);
        }
        let filter = match params.completed {
            Some(true) => TaskFilter::Completed,
            Some(false) => TaskFilter::Active,
            None => TaskFilter::All,
        };
        let query = TaskQuery {
            filter,
            search: params.search.clone().unwrap_or_default(),
            sort: params.sort,
        };
        Ok(query.apply(&state.tasks).into_iter().cloned().collect())
    }

    async fn create_task(&self, title: &str, due_date: Option<&str>) -> Result<Task> {
        let mut state = self.lock();
        state.mutation_calls += 1;
        if std::mem::take(&mut state.fail_next_create) {
            return Err(Error::Api("Failed to create task (HTTP 500)".to_string()));
        }
        state.next_id += 1;
        let task = Task {
            id: TaskId::new(format!("remote-{}", state.next_id)),
            title: title.to_string(),
            is_completed: false,
            due_date: due_date.map(str::to_string),
            added_at: 1_700_000_000_000 + i64::from(state.next_id),
        };
        state.tasks.insert(0, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, changes: &TaskChanges) -> Result<Task> {
        let mut state = self.lock();
        state.mutation_calls += 1;
        if std::mem::take(&mut state.fail_next_update) {
            return Err(Error::Api("Failed to update task (HTTP 500)".to_string()));
        }
        let task = state
            .tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Error::Api("Failed to update task: Todo not found (404)".to_string()))?;
        if let Some(title) = &changes.title {
            task.title.clone_from(title);
        }
        if let Some(completed) = changes.completed {
            task.is_completed = completed;
        }
        if let Some(instant) = &changes.to_be_completed_by {
            task.due_date = instant.get(..10).map(str::to_string);
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<Task> {
        let mut state = self.lock();
        state.mutation_calls += 1;
        if std::mem::take(&mut state.fail_next_delete) {
            return Err(Error::Api("Failed to delete task (HTTP 500)".to_string()));
        }
        let index = state
            .tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| Error::Api("Failed to delete task: Todo not found (404)".to_string()))?;
        Ok(state.tasks.remove(index))
    }
}

/// Four-task fixture: two completed, two active.
pub fn sample_tasks() -> Vec<Task> {
    let task = |id: &str, title: &str, is_completed: bool, due_date: Option<&str>, added_at| Task {
        id: TaskId::new(id),
        title: title.to_string(),
        is_completed,
        due_date: due_date.map(str::to_string),
        added_at,
    };
    vec![
        task("4", "Finalize Q4 report", true, Some("2024-10-25"), 4_000),
        task("3", "Schedule team sync", false, Some("2024-10-28"), 3_000),
        task("2", "Buy groceries", true, None, 2_000),
        task("1", "Renew gym membership", false, Some("2024-11-01"), 1_000),
    ]
}

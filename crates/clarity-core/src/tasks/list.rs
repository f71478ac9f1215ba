//! Ordered task collection, newest first.

use crate::error::{Error, Result};
use crate::models::{Task, TaskFilter, TaskId, TaskQuery};

/// The stored collection. Projections borrow from it and never reorder it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    #[must_use]
    pub const fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a task or fail with `NotFound`.
    pub fn require(&self, id: &TaskId) -> Result<&Task> {
        self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Filtered, searched and optionally sorted view.
    #[must_use]
    pub fn filtered(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(&self.tasks)
    }

    #[must_use]
    pub fn count(&self, filter: TaskFilter) -> usize {
        self.tasks.iter().filter(|task| filter.matches(task)).count()
    }

    pub(crate) fn push_front(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Replace the task stored under `id`, keeping its position.
    pub(crate) fn replace(&mut self, id: &TaskId, task: Task) -> Result<()> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        *slot = task;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub(crate) fn set_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Millisecond id that does not collide with an existing task.
    pub(crate) fn unused_millis_id(&self, now_millis: i64) -> TaskId {
        let mut millis = now_millis;
        loop {
            let id = TaskId::from_millis(millis);
            if !self.contains(&id) {
                return id;
            }
            millis = millis.saturating_add(1);
        }
    }
}

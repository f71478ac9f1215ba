//! Task list reconciler.
//!
//! [`TaskReconciler`] owns the visible task collection and is the only path
//! that mutates it. In [`Persistence::Local`] mode edits apply immediately; in
//! [`Persistence::Remote`] mode each mutation awaits the backend and only a
//! successful answer touches local state. A failed remote call leaves the
//! collection unchanged and records an inline message in `last_error`.

mod delete_gate;
mod list;

pub use delete_gate::{DeleteGate, DeleteState};
pub use list::TaskList;

use crate::api::{ListParams, TaskBackend, TaskChanges};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{Task, TaskDraft, TaskEdit, TaskId, TaskQuery};

/// Where task mutations are persisted. One mode per reconciler, never mixed.
#[derive(Debug, Clone)]
pub enum Persistence<B> {
    /// In-memory only; ids come from the clock.
    Local,
    /// Every mutation goes through the backend first.
    Remote(B),
}

#[derive(Debug)]
pub struct TaskReconciler<B, C> {
    list: TaskList,
    persistence: Persistence<B>,
    clock: C,
    delete_gate: DeleteGate,
    last_error: Option<String>,
}

impl<B, C> TaskReconciler<B, C>
where
    B: TaskBackend,
    C: Clock,
{
    pub fn new(persistence: Persistence<B>, clock: C) -> Self {
        Self {
            list: TaskList::default(),
            persistence,
            clock,
            delete_gate: DeleteGate::default(),
            last_error: None,
        }
    }

    pub fn local(clock: C) -> Self {
        Self::new(Persistence::Local, clock)
    }

    pub fn remote(backend: B, clock: C) -> Self {
        Self::new(Persistence::Remote(backend), clock)
    }

    /// Seed the collection, e.g. from a persisted local snapshot.
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.list = TaskList::from_tasks(tasks);
        self
    }

    pub const fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    /// Projection of the collection; the stored order is untouched.
    pub fn visible(&self, query: &TaskQuery) -> Vec<&Task> {
        self.list.filtered(query)
    }

    pub const fn is_remote(&self) -> bool {
        matches!(self.persistence, Persistence::Remote(_))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub const fn delete_gate(&self) -> &DeleteGate {
        &self.delete_gate
    }

    /// Replace the collection with the backend's list.
    ///
    /// Local mode keeps the current collection. `Unauthorized` is returned
    /// unchanged so the caller can send the user to login.
    pub async fn load(&mut self, params: &ListParams) -> Result<usize> {
        let Persistence::Remote(backend) = &self.persistence else {
            return Ok(self.list.len());
        };
        match backend.list_tasks(params).await {
            Ok(tasks) => {
                tracing::debug!("Loaded {} task(s) from backend", tasks.len());
                self.list.set_all(tasks);
                self.last_error = None;
                Ok(self.list.len())
            }
            Err(error) => Err(record_failure(
                &mut self.last_error,
                "Failed to fetch tasks",
                error,
            )),
        }
    }

    /// Validate `draft` and insert the new task at the front.
    pub async fn add(&mut self, draft: &TaskDraft) -> Result<Task> {
        let title = draft.title()?;
        let due_date = draft.due_date()?;

        let backend = match &self.persistence {
            Persistence::Local => {
                let now = self.clock.now_millis();
                let id = self.list.unused_millis_id(now);
                let task = Task::from_draft(id, draft, now)?;
                self.list.push_front(task.clone());
                self.last_error = None;
                return Ok(task);
            }
            Persistence::Remote(backend) => backend,
        };

        let created = match backend.create_task(&title, due_date.as_deref()).await {
            Ok(task) => task,
            Err(error) => {
                return Err(record_failure(
                    &mut self.last_error,
                    "Failed to create task",
                    error,
                ))
            }
        };
        tracing::info!("Created task {}", created.id);

        // Create has no completion field; a completed draft needs a follow-up patch.
        let task = if draft.is_completed && !created.is_completed {
            match backend
                .update_task(&created.id, &TaskChanges::completed(true))
                .await
            {
                Ok(updated) => updated,
                Err(error) => {
                    self.list.push_front(created);
                    return Err(record_failure(
                        &mut self.last_error,
                        "Failed to update task",
                        error,
                    ));
                }
            }
        } else {
            created
        };

        self.list.push_front(task.clone());
        self.last_error = None;
        Ok(task)
    }

    /// Flip the completion flag of `id`.
    pub async fn toggle(&mut self, id: &TaskId) -> Result<Task> {
        let mut toggled = self.list.require(id)?.clone();
        toggled.is_completed = !toggled.is_completed;
        let changes = TaskChanges::completed(toggled.is_completed);
        self.commit_update(id, toggled, &changes).await
    }

    /// Replace title, completion and due date of `id`.
    pub async fn save_edit(&mut self, id: &TaskId, edit: &TaskEdit) -> Result<Task> {
        let current = self.list.require(id)?;
        let edited = current.edited(edit)?;
        // PATCH has no way to unset `toBeCompletedBy`.
        if self.is_remote() && current.due_date.is_some() && edited.due_date.is_none() {
            return Err(Error::InvalidInput(
                "Clearing a due date is not supported by the backend".to_string(),
            ));
        }
        let changes = TaskChanges::replace_with(&edited);
        self.commit_update(id, edited, &changes).await
    }

    async fn commit_update(
        &mut self,
        id: &TaskId,
        local: Task,
        changes: &TaskChanges,
    ) -> Result<Task> {
        let task = match &self.persistence {
            Persistence::Local => local,
            Persistence::Remote(backend) => match backend.update_task(id, changes).await {
                Ok(task) => task,
                Err(error) => {
                    return Err(record_failure(
                        &mut self.last_error,
                        "Failed to update task",
                        error,
                    ))
                }
            },
        };
        self.list.replace(id, task.clone())?;
        self.last_error = None;
        Ok(task)
    }

    /// Stage `id` for deletion. Nothing is removed until [`Self::confirm_delete`].
    pub fn request_delete(&mut self, id: &TaskId) -> Result<()> {
        self.list.require(id)?;
        self.delete_gate.stage(id.clone())
    }

    pub fn cancel_delete(&mut self) -> Result<()> {
        self.delete_gate.cancel()
    }

    /// Delete the staged task.
    ///
    /// On failure the task stays in the collection and the gate stays open
    /// with an inline error, so calling this again retries.
    pub async fn confirm_delete(&mut self) -> Result<Task> {
        let Self {
            list,
            persistence,
            delete_gate,
            last_error,
            ..
        } = self;
        let pending = delete_gate.begin()?;
        let id = pending.id().clone();

        let removed = match persistence {
            Persistence::Local => list
                .remove(&id)
                .ok_or_else(|| Error::NotFound(id.to_string())),
            Persistence::Remote(backend) => backend
                .delete_task(&id)
                .await
                .map(|deleted| list.remove(&id).unwrap_or(deleted)),
        };

        match removed {
            Ok(task) => {
                pending.succeed();
                *last_error = None;
                tracing::info!("Deleted task {}", id);
                Ok(task)
            }
            Err(error) => {
                let message = error.user_message("Failed to delete task");
                tracing::warn!("{}", message);
                pending.fail(message.clone());
                *last_error = Some(message);
                Err(error)
            }
        }
    }
}

fn record_failure(last_error: &mut Option<String>, failure: &str, error: Error) -> Error {
    let message = error.user_message(failure);
    tracing::warn!("{}", message);
    *last_error = Some(message);
    error
}

#[cfg(test)]
mod tests;

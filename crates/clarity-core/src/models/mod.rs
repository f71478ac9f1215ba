//! Data models for Clarity

mod query;
mod task;

pub use query::{SortKey, TaskFilter, TaskQuery};
pub use task::{normalize_due_date, Task, TaskDraft, TaskEdit, TaskId, NO_DUE_DATE};

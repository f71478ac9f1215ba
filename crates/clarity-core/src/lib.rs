//! clarity-core - Core library for Clarity
//!
//! This crate contains the task models, the REST backend client, the
//! backend availability prober and the task list reconciler shared by
//! every Clarity front end.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod probe;
pub mod tasks;
pub mod util;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use models::{Task, TaskDraft, TaskEdit, TaskFilter, TaskId, TaskQuery};

use clarity_core::api::ListParams;
use clarity_core::{Task, TaskEdit};

use crate::commands::common::{
    format_task_line, open_reconciler, parse_task_id, persist, CommandContext,
};
use crate::error::CliError;

/// Prefill from `task` and apply the flags that were passed.
pub fn build_edit(
    task: &Task,
    title: Option<String>,
    due: Option<String>,
    completed: Option<bool>,
) -> Result<TaskEdit, CliError> {
    if title.is_none() && due.is_none() && completed.is_none() {
        return Err(CliError::NothingToEdit);
    }
    let mut edit = TaskEdit::from_task(task);
    if let Some(title) = title {
        edit.title = title;
    }
    if let Some(due) = due {
        edit.due_date = Some(due);
    }
    if let Some(completed) = completed {
        edit.is_completed = completed;
    }
    Ok(edit)
}

pub async fn run_edit(
    context: &CommandContext,
    id: &str,
    title: Option<String>,
    due: Option<String>,
    completed: Option<bool>,
) -> Result<(), CliError> {
    let id = parse_task_id(id)?;
    let mut reconciler = open_reconciler(context, &ListParams::default()).await?;
    let current = reconciler.list().require(&id)?;
    let edit = build_edit(current, title, due, completed)?;

    let task = reconciler.save_edit(&id, &edit).await?;
    persist(context, &reconciler)?;

    println!("{}", format_task_line(&task));
    Ok(())
}

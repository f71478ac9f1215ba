use clarity_core::api::ListParams;
use clarity_core::TaskDraft;

use crate::commands::common::{
    format_task_line, open_reconciler, persist, resolve_description, CommandContext,
};
use crate::error::CliError;

pub async fn run_add(
    context: &CommandContext,
    description_parts: &[String],
    due: Option<String>,
    completed: bool,
) -> Result<(), CliError> {
    let description = resolve_description(description_parts)?;
    let draft = TaskDraft::new(description)
        .with_due_date(due.unwrap_or_default())
        .completed(completed);
    // Validate before touching the network.
    draft.title()?;
    draft.due_date()?;

    let mut reconciler = open_reconciler(context, &ListParams::default()).await?;
    let task = reconciler.add(&draft).await?;
    persist(context, &reconciler)?;

    println!("{}", format_task_line(&task));
    Ok(())
}

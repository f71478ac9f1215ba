use clarity_core::api::ListParams;
use clarity_core::TaskQuery;

use crate::commands::common::{
    format_counts, format_task_lines, open_reconciler, task_to_list_item, CommandContext,
    TaskListItem,
};
use crate::error::CliError;

pub async fn run_list(
    context: &CommandContext,
    query: &TaskQuery,
    as_json: bool,
) -> Result<(), CliError> {
    let reconciler = open_reconciler(context, &ListParams::from_query(query)).await?;
    let tasks = reconciler.visible(query);

    if as_json {
        let json_items = tasks
            .iter()
            .map(|task| task_to_list_item(task))
            .collect::<Vec<TaskListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks found.");
    } else {
        for line in format_task_lines(&tasks) {
            println!("{line}");
        }
    }
    if !reconciler.is_remote() {
        println!("\n{}", format_counts(reconciler.list()));
    }
    Ok(())
}

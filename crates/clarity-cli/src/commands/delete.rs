use std::io;

use clarity_core::api::ListParams;

use crate::commands::common::{
    open_reconciler, parse_task_id, persist, prompt_confirmation, CommandContext,
};
use crate::error::CliError;

pub async fn run_delete(
    context: &CommandContext,
    id: &str,
    assume_yes: bool,
) -> Result<(), CliError> {
    let id = parse_task_id(id)?;
    let mut reconciler = open_reconciler(context, &ListParams::default()).await?;
    let title = reconciler.list().require(&id)?.title.clone();
    reconciler.request_delete(&id)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stderr();
    let mut prompt = format!("Delete \"{title}\"?");

    loop {
        if !assume_yes && !prompt_confirmation(&prompt, &mut input, &mut output)? {
            reconciler.cancel_delete()?;
            println!("Cancelled");
            return Ok(());
        }

        match reconciler.confirm_delete().await {
            Ok(task) => {
                persist(context, &reconciler)?;
                println!("Deleted {}", task.id);
                return Ok(());
            }
            Err(error) if assume_yes || error.is_unauthorized() => return Err(error.into()),
            Err(_) => {
                let message = reconciler
                    .delete_gate()
                    .error()
                    .unwrap_or("Failed to delete task");
                eprintln!("{message}");
                prompt = format!("Retry deleting \"{title}\"?");
            }
        }
    }
}

use clarity_core::api::ListParams;

use crate::commands::common::{
    format_task_line, open_reconciler, parse_task_id, persist, CommandContext,
};
use crate::error::CliError;

pub async fn run_toggle(context: &CommandContext, id: &str) -> Result<(), CliError> {
    let id = parse_task_id(id)?;
    let mut reconciler = open_reconciler(context, &ListParams::default()).await?;
    let task = reconciler.toggle(&id).await?;
    persist(context, &reconciler)?;

    println!("{}", format_task_line(&task));
    Ok(())
}

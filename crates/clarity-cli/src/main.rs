//! Clarity CLI - manage a to-do list from the terminal
//!
//! Talks to the Clarity REST backend (waiting for it to wake up first) or
//! keeps tasks in a local file, depending on the profile's persistence mode.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::Parser;
use clarity_core::TaskQuery;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::CommandContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::health::run_health;
use crate::commands::list::run_list;
use crate::commands::toggle::run_toggle;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive: Directive = "clarity=info"
        .parse()
        .map_err(|error| CliError::Config(format!("Invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run_command(cli.profile.as_deref(), cli.command).await
}

async fn run_command(profile: Option<&str>, command: Commands) -> Result<(), CliError> {
    // Config and completions run without resolving a profile context.
    let context = || CommandContext::resolve(profile);
    match command {
        Commands::Config { command } => run_config(command, profile),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Health { watch } => run_health(&context()?, watch).await,
        Commands::List {
            filter,
            search,
            sort,
            json,
        } => {
            let mut query = TaskQuery::new(filter.into()).with_search(search.unwrap_or_default());
            query.sort = sort.map(Into::into);
            run_list(&context()?, &query, json).await
        }
        Commands::Add {
            description,
            due,
            completed,
        } => run_add(&context()?, &description, due, completed).await,
        Commands::Toggle { id } => run_toggle(&context()?, &id).await,
        Commands::Edit {
            id,
            title,
            due,
            completed,
        } => run_edit(&context()?, &id, title, due, completed).await,
        Commands::Delete { id, yes } => run_delete(&context()?, &id, yes).await,
        Commands::Auth { command } => run_auth(&context()?, command).await,
    }
}

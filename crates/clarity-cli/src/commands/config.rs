use std::env;

use clarity_core::config::{normalize_base_url, PersistenceMode};
use clarity_core::util::normalize_text_option;

use crate::cli::{ConfigCommands, PersistenceArg};
use crate::commands::common::{activity_cache_path, CommandContext};
use crate::config_profiles::{default_config_path, CliProfilesConfig, API_BASE_URL_ENV};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            persistence,
            no_activate,
        } => run_config_init(
            global_profile,
            api_base_url,
            persistence,
            no_activate,
        ),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_base_url: Option<String>,
    persistence: Option<PersistenceArg>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    let api_base_url = resolve_api_base_url(
        api_base_url,
        normalize_text_option(env::var(API_BASE_URL_ENV).ok()),
    )?;

    let profile = config.profile_mut_or_default(&profile_name);
    if let Some(url) = api_base_url {
        profile.api_base_url = Some(url);
    }
    if let Some(mode) = persistence {
        profile.persistence = Some(PersistenceMode::from(mode));
    }
    let mode = profile.persistence();

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    if mode == PersistenceMode::Remote {
        println!("Run `clarity auth login --identifier <user> --password <password>` to sign in.");
    }
    Ok(())
}

/// Explicit flag first, then the environment; validated and normalized.
pub fn resolve_api_base_url(
    explicit: Option<String>,
    from_env: Option<String>,
) -> Result<Option<String>, CliError> {
    normalize_text_option(explicit)
        .or(from_env)
        .map(|url| normalize_base_url(&url))
        .transpose()
        .map_err(|error| CliError::Config(error.to_string()))
}

fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let context = CommandContext::resolve(global_profile)?;
    let config_path = default_config_path().map_err(CliError::Config)?;

    println!("profile:      {}", context.profile_name);
    println!("api_base_url: {}", context.config.api_base_url);
    println!("persistence:  {}", context.config.persistence);
    println!("config file:  {}", config_path.display());
    if context.config.is_remote() {
        println!("probe cache:  {}", activity_cache_path()?.display());
    } else {
        println!("tasks file:   {}", context.tasks_path()?.display());
    }
    Ok(())
}

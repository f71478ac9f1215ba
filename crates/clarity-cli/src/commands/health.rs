use clarity_core::clock::{ActivityCache, FileActivityCache};
use clarity_core::probe::ProbeOutcome;

use crate::commands::common::{activity_cache_path, format_age, wait_for_backend, CommandContext};
use crate::error::CliError;

pub async fn run_health(context: &CommandContext, watch: bool) -> Result<(), CliError> {
    let prober = context.prober(context.remote_backend()?)?;

    if !watch {
        match wait_for_backend(&prober).await? {
            ProbeOutcome::CacheHit => {
                let seen = FileActivityCache::new(activity_cache_path()?).get()?;
                let age = seen.map(format_age).unwrap_or_default();
                println!("Server ready (seen {age})");
            }
            ProbeOutcome::Reachable { attempts } => {
                println!("Server ready after {attempts} probe(s)");
            }
            _ => {}
        }
        return Ok(());
    }

    if !prober.cache_is_fresh() {
        eprintln!("Connecting to server...");
    }
    let mut handle = prober.spawn();
    let interrupted = tokio::select! {
        ready = handle.wait_ready() => {
            if !ready {
                return Err(CliError::ServerUnavailable);
            }
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        handle.shutdown().await;
        return Err(CliError::Interrupted);
    }

    println!(
        "Server ready. Re-checking every {}s, press Ctrl-C to stop.",
        context.config.cache_duration.as_secs()
    );
    tokio::signal::ctrl_c().await?;
    handle.shutdown().await;
    println!("Stopped");
    Ok(())
}

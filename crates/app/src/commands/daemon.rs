//! Daemon command - run the daily schedule in the foreground.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use hoyosign_infra::{ScheduleEngine, ScheduleEngineConfig};
use tracing::{info, warn};

use super::{ctrl_c_token, format_next_run, Context};

/// How often stored schedule settings are re-read.
const SETTINGS_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// Arguments for the daemon command.
#[derive(Args, Debug)]
pub struct DaemonArgs {
    /// Also claim once right away
    #[arg(long)]
    pub run_now: bool,
}

/// Run the daemon command.
pub async fn run(args: DaemonArgs, ctx: &Context) -> Result<()> {
    let settings = ctx.schedule_settings().await?;
    if !settings.enabled {
        bail!("the schedule is disabled; turn it on with `hoyosign schedule enable`");
    }

    let engine = ScheduleEngine::new(ctx.orchestrator.clone(), settings.time, Arc::clone(&ctx.clock))
        .with_config(ScheduleEngineConfig::from(&ctx.config.pacing));
    engine.start().await?;
    println!(
        "Daily claim at {}; next run {}",
        settings.time,
        format_next_run(engine.next_run(), ctx.clock.now_local())
    );

    if args.run_now {
        let _manual = engine.run_now();
    }

    let cancel = ctrl_c_token();
    let mut reload = tokio::time::interval(SETTINGS_RELOAD_INTERVAL);
    reload.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = reload.tick() => {
                match ctx.schedule_settings().await {
                    Ok(current) if !current.enabled => {
                        info!("Schedule disabled; shutting down");
                        break;
                    }
                    Ok(current) if current.time != engine.time() => engine.set_time(current.time),
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "Failed to reload schedule settings"),
                }
            }
        }
    }

    engine.stop().await?;
    println!("Stopped");
    Ok(())
}

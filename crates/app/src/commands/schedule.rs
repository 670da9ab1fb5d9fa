//! Schedule command - show or change the daily schedule.

use anyhow::Result;
use clap::{Args, Subcommand};
use hoyosign_domain::ScheduleTime;
use serde_json::json;

use super::{format_next_run, Context};

/// Arguments for the schedule command.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Show the schedule and the next run
    Status,

    /// Set the daily claim time
    Set {
        /// Local time, HH:MM
        time: String,
    },

    /// Turn the daily run on
    Enable,

    /// Turn the daily run off
    Disable,
}

/// Run the schedule command.
pub async fn run(args: ScheduleArgs, ctx: &Context) -> Result<()> {
    let mut settings = ctx.schedule_settings().await?;

    match args.command {
        ScheduleCommand::Status => {
            let next = settings.time.next_after(ctx.clock.now_local());
            if ctx.json_output {
                let status = json!({
                    "enabled": settings.enabled,
                    "time": settings.time,
                    "next_run": next.format("%Y-%m-%d %H:%M").to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                let state = if settings.enabled { "enabled" } else { "disabled" };
                println!("Daily claim at {} ({state})", settings.time);
                if settings.enabled {
                    println!("Next run: {}", format_next_run(next, ctx.clock.now_local()));
                }
            }
            return Ok(());
        }
        ScheduleCommand::Set { time } => {
            // Parse first so a bad value changes nothing
            settings.time = time.parse::<ScheduleTime>()?;
        }
        ScheduleCommand::Enable => settings.enabled = true,
        ScheduleCommand::Disable => settings.enabled = false,
    }

    ctx.accounts.save_schedule_settings(settings).await?;
    let state = if settings.enabled { "enabled" } else { "disabled" };
    println!("Daily claim at {} ({state})", settings.time);
    Ok(())
}

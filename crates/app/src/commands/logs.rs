//! Logs command - show or clear the claim log.

use anyhow::Result;
use clap::{Args, Subcommand};
use hoyosign_infra::LogQuery;

use super::{format_local, Context};

/// Arguments for the logs command.
#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: Option<LogsCommand>,

    /// Show at most this many entries
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Only this account
    #[arg(long)]
    pub account: Option<String>,

    /// Only today's entries
    #[arg(long)]
    pub today: bool,
}

#[derive(Subcommand, Debug)]
pub enum LogsCommand {
    /// Delete every entry
    Clear,
}

/// Run the logs command.
pub async fn run(args: LogsArgs, ctx: &Context) -> Result<()> {
    if let Some(LogsCommand::Clear) = args.command {
        ctx.claim_log.clear().await?;
        println!("Claim log cleared");
        return Ok(());
    }

    let query = LogQuery { limit: Some(args.limit), account_id: args.account, today: args.today };
    let entries = ctx.claim_log.query(&query).await;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for entry in &entries {
        let mark = if entry.success { "✓" } else { "✗" };
        println!(
            "{}  {mark} {} / {}: {}",
            format_local(&entry.timestamp),
            entry.account_name,
            entry.game_name,
            entry.message
        );
    }
    Ok(())
}

//! hoyosign - unattended daily check-in claims
//!
//! Main entry point for the hoyosign CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{accounts, autostart, claim, daemon, login, logs, schedule};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// hoyosign - daily check-in claims for miHoYo games
#[derive(Parser, Debug)]
#[command(name = "hoyosign")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML or JSON)
    #[arg(long, global = true, env = "HOYOSIGN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an account by scanning a QR code with the miHoYo app
    Login(login::LoginArgs),

    /// Manage stored accounts
    Accounts(accounts::AccountsArgs),

    /// Claim today's rewards now
    Claim(claim::ClaimArgs),

    /// Show or change the daily schedule
    Schedule(schedule::ScheduleArgs),

    /// Run the daily schedule until interrupted
    Daemon(daemon::DaemonArgs),

    /// Show or clear the claim log
    Logs(logs::LogsArgs),

    /// Start the daemon with the desktop session
    Autostart(autostart::AutostartArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "hoyosign=debug,hoyosign_core=debug,hoyosign_infra=debug,info"
    } else {
        "hoyosign=info,hoyosign_core=info,hoyosign_infra=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = hoyosign_infra::config::load(cli.config.clone())?;
    let ctx = commands::Context::from_config(config, cli.json)?;

    match cli.command {
        Commands::Login(args) => login::run(args, &ctx).await,
        Commands::Accounts(args) => accounts::run(args, &ctx).await,
        Commands::Claim(args) => claim::run(args, &ctx).await,
        Commands::Schedule(args) => schedule::run(args, &ctx).await,
        Commands::Daemon(args) => daemon::run(args, &ctx).await,
        Commands::Logs(args) => logs::run(args, &ctx).await,
        Commands::Autostart(args) => autostart::run(args, &ctx),
    }
}
